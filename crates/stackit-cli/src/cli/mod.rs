//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use stackit_core::config;
use stackit_core::forum::{PageQuery, VoteDirection, VoteTarget};
use stackit_core::logging;
use stackit_core::session::Session;

mod commands;

#[derive(Parser)]
#[command(name = "stackit")]
#[command(version)]
#[command(about = "StackIt Q&A forum client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend origin (overrides STACKIT_BASE_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with a username or email
    Login {
        /// Username or email (prompted if omitted)
        #[arg(short, long)]
        identifier: Option<String>,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account and log in
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log out (forget the stored token)
    Logout,

    /// Show whether a token is held
    Status {
        /// Also fetch the profile from the server
        #[arg(long)]
        remote: bool,
    },

    /// Browse and ask questions
    Questions {
        #[command(subcommand)]
        command: QuestionCommands,
    },

    /// Answer questions
    Answers {
        #[command(subcommand)]
        command: AnswerCommands,
    },

    /// Vote on a question or an answer (repeat to withdraw)
    Vote {
        /// Vote direction: up or down
        #[arg(value_name = "DIRECTION")]
        direction: VoteDirection,
        /// Question to vote on
        #[arg(long, value_name = "ID", conflicts_with = "answer", required_unless_present = "answer")]
        question: Option<u64>,
        /// Answer to vote on
        #[arg(long, value_name = "ID")]
        answer: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum QuestionCommands {
    /// Lists questions
    List {
        /// Page number (server default when omitted)
        #[arg(long)]
        page: Option<u32>,
        /// Questions per page
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Posts a new question
    Ask {
        #[arg(short, long)]
        title: String,
        /// Question body (HTML allowed)
        #[arg(short, long)]
        content: String,
    },
    /// Shows a question with its answers
    Show {
        #[arg(value_name = "QUESTION_ID")]
        id: u64,
    },
}

#[derive(clap::Subcommand)]
enum AnswerCommands {
    /// Posts an answer to a question
    Post {
        #[arg(value_name = "QUESTION_ID")]
        question_id: u64,
        /// Answer body (HTML allowed)
        #[arg(short, long)]
        content: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Save the backend origin to the config file
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config).context("init logging")?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, &config).await })
}

async fn dispatch(cli: Cli, config: &config::Config) -> Result<()> {
    let Cli { command, base_url } = cli;

    // built per command so config commands work even with a broken URL
    let session = || {
        Session::from_config(config, base_url.as_deref()).context("resolve backend URL")
    };

    match command {
        Commands::Login {
            identifier,
            password,
        } => commands::auth::login(&session()?, identifier, password).await,

        Commands::Register {
            username,
            email,
            password,
        } => commands::auth::register(&session()?, &username, &email, password).await,

        Commands::Logout => commands::auth::logout(&session()?).await,

        Commands::Status { remote } => commands::auth::status(&session()?, remote).await,

        Commands::Questions { command } => match command {
            QuestionCommands::List { page, per_page } => {
                commands::questions::list(&session()?, PageQuery { page, per_page }).await
            }
            QuestionCommands::Ask { title, content } => {
                commands::questions::ask(&session()?, title, content).await
            }
            QuestionCommands::Show { id } => commands::questions::show(&session()?, id).await,
        },

        Commands::Answers { command } => match command {
            AnswerCommands::Post {
                question_id,
                content,
            } => commands::answers::post(&session()?, question_id, content).await,
        },

        Commands::Vote {
            direction,
            question,
            answer,
        } => {
            let target = match (question, answer) {
                (Some(id), None) => VoteTarget::Question(id),
                (None, Some(id)) => VoteTarget::Answer(id),
                _ => anyhow::bail!("Please specify exactly one of --question or --answer"),
            };
            commands::votes::cast(&session()?, target, direction).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetBaseUrl { url } => commands::config::set_base_url(&url),
        },
    }
}
