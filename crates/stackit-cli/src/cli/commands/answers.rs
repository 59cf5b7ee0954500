//! Answer command handlers.

use anyhow::Result;
use stackit_core::forum::{AnswerDraft, Forum};
use stackit_core::session::Session;

use super::navigate;

pub async fn post(session: &Session, question_id: u64, content: String) -> Result<()> {
    let next = Forum::new(session)
        .post_answer(question_id, &AnswerDraft { content })
        .await?;

    println!("✓ Answer posted to question #{question_id}");

    navigate(session, next).await
}
