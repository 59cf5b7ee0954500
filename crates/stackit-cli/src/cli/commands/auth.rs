//! Auth command handlers.

use anyhow::Result;
use stackit_core::config::paths;
use stackit_core::session::Session;
use stackit_core::token_store::mask_token;

use super::{navigate, prompt};

pub async fn login(
    session: &Session,
    identifier: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let identifier = match identifier {
        Some(identifier) => identifier,
        None => prompt("Username or email: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    let next = session.login(&identifier, &password).await?;

    println!("✓ Logged in as {identifier}");
    println!("  Credentials saved to: {}", paths::credentials_path().display());

    navigate(session, next).await
}

pub async fn register(
    session: &Session,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };

    let next = session.register(username, email, &password).await?;

    println!("✓ Registered and logged in as {username}");
    println!("  Credentials saved to: {}", paths::credentials_path().display());

    navigate(session, next).await
}

pub async fn logout(session: &Session) -> Result<()> {
    let was_authenticated = session.is_authenticated();

    // clear even when anonymous so empty or unreadable entries are removed
    let next = session.logout()?;
    if was_authenticated {
        println!("✓ Logged out");
        println!(
            "  Credentials removed from: {}",
            paths::credentials_path().display()
        );
    } else {
        println!("Not logged in (no credentials found).");
    }

    navigate(session, next).await
}

pub async fn status(session: &Session, remote: bool) -> Result<()> {
    println!("Server: {}", session.api().base_url());

    let Some(token) = session.token() else {
        println!("Not logged in.");
        return Ok(());
    };

    println!("✓ Logged in (token: {})", mask_token(&token));

    if remote {
        let user = session.current_user().await?;
        println!("  User: {} (id {})", user.username, user.id);
        if let Some(email) = &user.email {
            println!("  Email: {email}");
        }
        println!("  Reputation: {}", user.reputation);
    }

    Ok(())
}
