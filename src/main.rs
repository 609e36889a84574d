// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use skolakit::{cli::Cli, error::AppError, logging, run_from_cli};
use std::{env, time::Duration};

#[tokio::main]
async fn main() {
    // ANSI colors on Windows terminals
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!("\n{} Interrupted by user.", "[!]".yellow());
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::process::exit(130);
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "skolakit".to_string());

    let after_help = format!(
        "Examples:\n  # Extract a full course\n  {bin} udemy \"https://www.udemy.com/course/the-slug/\"\n\n  # Single video transcript\n  {bin} youtube \"https://youtu.be/dQw4w9WgXcQ\"\n\n  # Validate a skill directory\n  {bin} skill validate ./my-skill\n\n  # Cache a research note for 30 days\n  {bin} research put react-hooks -t \"React Hooks\" -f notes.md",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = Cli::from_arg_matches(&cmd.get_matches()).unwrap();

    logging::setup(args.log_level);

    match run_from_cli(args).await {
        Ok(code) => std::process::exit(code),
        Err(AppError::UserInterrupt) => std::process::exit(130),
        Err(e) => {
            eprintln!("\n{} {}", "[X]".red(), format!("{}", e).red());
            std::process::exit(1);
        }
    }
}
