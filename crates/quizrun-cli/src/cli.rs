//! Command-line arguments. Every flag can also come from the environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "quizrun")]
#[command(about = "Take quizzes solo against a scorer, or compete on one terminal")]
pub struct Args {
    /// Log output format
    #[arg(long, env = "QUIZRUN_LOG_FORMAT", default_value = "json")]
    pub log_format: LogFormat,

    /// Question bank file (YAML, or JSON by extension)
    #[arg(long, env = "QUIZRUN_BANK")]
    pub bank: Option<PathBuf>,

    /// Base URL of the quiz REST backend; solo attempts use it instead of the bank
    #[arg(long, env = "QUIZRUN_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token of the signed-in user
    #[arg(long, env = "QUIZRUN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Identifier of the signed-in user, recorded with attempts
    #[arg(long, env = "QUIZRUN_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the quizzes in the bank
    List,

    /// Take a quiz alone; the store scores it
    Solo {
        /// Quiz to take
        #[arg(long, default_value = "1")]
        quiz: u64,

        /// Run as a timed challenge
        #[arg(long)]
        timed: bool,

        /// Countdown in seconds (minimum 30); overrides QUIZRUN_DURATION_SECONDS
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Compete on one terminal, taking turns over a shared shuffled pool
    Compete {
        /// Number of players (2-4); overrides QUIZRUN_PLAYER_COUNT
        #[arg(long)]
        players: Option<usize>,

        /// Player names in turn order; repeat the flag per player
        #[arg(long = "name")]
        names: Vec<String>,

        /// Draw the pool from one quiz instead of the whole bank
        #[arg(long)]
        quiz: Option<u64>,

        /// Shuffle seed, for reproducible rounds
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}
