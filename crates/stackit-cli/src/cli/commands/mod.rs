//! CLI command handlers.

pub mod answers;
pub mod auth;
pub mod config;
pub mod questions;
pub mod votes;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use stackit_core::forum::PageQuery;
use stackit_core::session::{Navigation, Session};

/// Renders the view an operation navigated to.
async fn navigate(session: &Session, to: Navigation) -> Result<()> {
    match to {
        Navigation::Home => {
            println!();
            questions::list(session, PageQuery::default()).await
        }
        Navigation::Question(id) => {
            println!();
            questions::show(session, id).await
        }
        Navigation::Login => {
            println!("Run `stackit login` to sign in again.");
            Ok(())
        }
    }
}

/// Reads one line from stdin after printing `label`.
fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .context("read from stdin")?;
    let value = input.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label.trim_end_matches([':', ' ']));
    }
    Ok(value)
}
