// src/lib.rs

pub mod adr;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod infograph;
pub mod logging;
pub mod research;
pub mod skill;
pub mod symbols;
pub mod tutorial;
pub mod ui;
pub mod udemy;
pub mod utils;
pub mod youtube;

use crate::{
    cli::{AdrCommand, Cli, Command, SkillCommand, TutorialCommand},
    error::AppResult,
};
use log::debug;

/// Library entry point, called from `main.rs`. Returns the process exit
/// code: some commands (skill validation, cache lookups) distinguish
/// "ran fine, found problems" from hard failures.
pub async fn run_from_cli(args: Cli) -> AppResult<i32> {
    debug!("CLI args: {:?}", args);

    match &args.command {
        Command::Udemy(udemy_args) => {
            udemy::run(udemy_args).await?;
            Ok(0)
        }
        Command::Youtube(youtube_args) => {
            youtube::run(youtube_args).await?;
            Ok(0)
        }
        Command::Skill {
            command:
                SkillCommand::Validate {
                    skill_path,
                    min_severity,
                    format,
                    ignore,
                },
        } => skill::run_validate(skill_path, *min_severity, *format, ignore),
        Command::Adr { command } => {
            match command {
                AdrCommand::Create {
                    title,
                    dir,
                    template,
                    create_dir,
                } => adr::create(title, dir.as_deref(), *template, *create_dir)?,
                AdrCommand::Index { dir, dry_run } => adr::index(dir, *dry_run)?,
                AdrCommand::Supersede { old, new, dir } => adr::supersede(*old, *new, dir)?,
            }
            Ok(0)
        }
        Command::Research { command } => research::run(command),
        Command::Infograph(infograph_args) => {
            infograph::run(infograph_args).await?;
            Ok(0)
        }
        Command::Tutorial { command } => match command {
            TutorialCommand::Validate {
                article,
                video_script,
                chapters,
                seo,
            } => tutorial::run_validate(
                article,
                video_script.as_deref(),
                chapters.as_deref(),
                seo.as_deref(),
            ),
            TutorialCommand::ValidateMicro {
                micro_blog,
                video_script,
            } => tutorial::run_validate_micro(micro_blog, video_script.as_deref()),
        },
    }
}
