//! Vote command handler.

use anyhow::Result;
use stackit_core::forum::{Forum, VoteAction, VoteDirection, VoteTarget};
use stackit_core::session::Session;

pub async fn cast(session: &Session, target: VoteTarget, direction: VoteDirection) -> Result<()> {
    let outcome = Forum::new(session).vote(target, direction).await?;

    let subject = match target {
        VoteTarget::Question(id) => format!("question #{id}"),
        VoteTarget::Answer(id) => format!("answer #{id}"),
    };
    match outcome.action {
        VoteAction::Created => println!("✓ Voted {direction} on {subject}"),
        VoteAction::Changed => println!("✓ Changed vote on {subject} to {direction}"),
        VoteAction::Removed => println!("✓ Removed vote on {subject}"),
    }

    let counts = outcome.vote_counts;
    println!(
        "  Score: {} (+{} / -{})",
        counts.total, counts.upvotes, counts.downvotes
    );
    Ok(())
}
