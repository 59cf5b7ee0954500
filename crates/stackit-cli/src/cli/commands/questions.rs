//! Question command handlers.

use anyhow::Result;
use stackit_core::forum::{Forum, PageQuery, Question, QuestionDraft};
use stackit_core::render;
use stackit_core::session::Session;

use super::navigate;

const EXCERPT_CHARS: usize = 100;

pub async fn list(session: &Session, page: PageQuery) -> Result<()> {
    let listing = Forum::new(session).load_listing(page).await;

    if let Some(error) = &listing.error {
        eprintln!("Could not load questions: {error}");
    }

    if listing.is_empty() {
        println!("No questions yet.");
        return Ok(());
    }

    for question in &listing.questions {
        print_summary(question);
    }
    Ok(())
}

pub async fn ask(session: &Session, title: String, content: String) -> Result<()> {
    let draft = QuestionDraft { title, content };
    let next = Forum::new(session).submit_question(&draft).await?;

    println!("✓ Question posted: {}", draft.title);

    navigate(session, next).await
}

pub async fn show(session: &Session, id: u64) -> Result<()> {
    let details = Forum::new(session).details(id).await?;
    let question = &details.question;

    println!("#{}  {}", question.id, question.title);
    println!("Votes: {}", question.votes);
    let body = render::plain_text(&question.body);
    if !body.is_empty() {
        println!();
        println!("{body}");
    }

    println!();
    if details.answers.is_empty() {
        println!("No answers yet.");
    } else {
        println!("Answers ({}):", details.answers.len());
        for answer in &details.answers {
            println!();
            println!("  [#{}]", answer.id);
            for line in render::plain_text(&answer.content).lines() {
                println!("  {line}");
            }
        }
    }
    Ok(())
}

fn print_summary(question: &Question) {
    let votes = if question.votes == 1 { "vote" } else { "votes" };
    println!(
        "#{:<5} {}  ({} {votes})",
        question.id, question.title, question.votes
    );
    let excerpt = render::excerpt(&question.body, EXCERPT_CHARS);
    if !excerpt.is_empty() {
        println!("       {excerpt}");
    }
}
