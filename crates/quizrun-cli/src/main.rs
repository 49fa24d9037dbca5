//! Quizrun terminal entry point.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use quizrun_core::collaborator::{IdentityProvider, QuizStore};
use quizrun_engine::config::EngineConfig;
use quizrun_store::bank::QuizBank;
use quizrun_store::http::HttpQuizStore;
use quizrun_store::identity::TokenIdentity;
use quizrun_store::memory::InMemoryQuizStore;
use tracing_subscriber::EnvFilter;

mod cli;
mod compete;
mod input;
mod render;
mod solo;

use cli::{Args, Command, LogFormat};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let Args {
        log_format,
        bank,
        api_url,
        token,
        user,
        command,
    } = Args::parse();
    init_tracing(log_format);

    tracing::info!("Starting Quizrun");

    let base = EngineConfig::from_env()?;
    let identity = Arc::new(TokenIdentity::new(token.clone(), user));

    match command {
        Command::List => {
            let store = bank_store(bank.as_deref(), identity)?;
            render::quiz_list(&store.list_quizzes());
        }
        Command::Solo {
            quiz,
            timed,
            duration,
        } => {
            let config = EngineConfig {
                duration_seconds: duration.unwrap_or(base.duration_seconds),
                ..base
            }
            .validated()?;
            let store: Arc<dyn QuizStore> = match api_url {
                Some(url) => Arc::new(HttpQuizStore::new(url).with_access_token(token)),
                None => Arc::new(bank_store(bank.as_deref(), identity.clone())?),
            };
            let timer = timed.then_some(config.duration_seconds);
            solo::run(quiz, store, identity, timer).await?;
        }
        Command::Compete {
            players,
            names,
            quiz,
            seed,
        } => {
            let config = EngineConfig {
                player_count: players.unwrap_or(base.player_count),
                ..base
            }
            .validated()?;
            let store = bank_store(bank.as_deref(), identity)?;
            compete::run(&store, &config, names, quiz, seed).await?;
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn bank_store(
    path: Option<&Path>,
    identity: Arc<TokenIdentity>,
) -> Result<InMemoryQuizStore, Box<dyn Error>> {
    let path = path.ok_or("a question bank is required: pass --bank or set QUIZRUN_BANK")?;
    let bank = QuizBank::load(path)?;
    let identity: Arc<dyn IdentityProvider> = identity;
    Ok(InMemoryQuizStore::new(bank).with_identity(identity))
}
