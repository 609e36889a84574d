// src/cli.rs

use clap::{Parser, Subcommand, ValueEnum, command, crate_version};
use std::path::PathBuf;

/// Log file verbosity
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuizFormat {
    Yaml,
    Json,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ListFormat {
    Table,
    Json,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdrTemplate {
    Minimal,
    Madr,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeverityArg {
    Critical,
    Error,
    Warning,
    Suggestion,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageEngine {
    Gemini,
    Nanobanana,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageMode {
    Text,
    Structured,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// (hidden) log file verbosity, for debugging
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract transcripts, articles, quizzes and resources from a course
    Udemy(UdemyArgs),
    /// Extract transcripts and metadata from a video or playlist
    Youtube(YoutubeArgs),
    /// Skill directory tooling
    Skill {
        #[command(subcommand)]
        command: SkillCommand,
    },
    /// Architecture Decision Record management
    Adr {
        #[command(subcommand)]
        command: AdrCommand,
    },
    /// Research cache with TTL and docs promotion
    Research {
        #[command(subcommand)]
        command: ResearchCommand,
    },
    /// Generate infographic images via a generative image API
    Infograph(InfographArgs),
    /// Tutorial output tooling
    Tutorial {
        #[command(subcommand)]
        command: TutorialCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TutorialCommand {
    /// Check generated tutorial files for structure and completeness
    Validate {
        /// Blog article markdown file
        article: PathBuf,
        /// Video script markdown file
        video_script: Option<PathBuf>,
        /// Chapter markers JSON file
        chapters: Option<PathBuf>,
        /// SEO metadata YAML file
        seo: Option<PathBuf>,
    },
    /// Check microlesson files for structure and the word limit
    ValidateMicro {
        /// Micro blog markdown file
        micro_blog: PathBuf,
        /// Video script markdown file
        video_script: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct UdemyArgs {
    /// Course URL, e.g. https://www.udemy.com/course/the-slug/
    pub course_url: String,
    /// Custom output directory (default: course slug)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Comma-separated content types to extract: video,article,quiz,resource
    #[arg(long, default_value = "all", value_name = "TYPES")]
    pub content_types: String,
    /// Skip promotional/bonus lectures
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub skip_promotional: bool,
    /// Output format for quizzes
    #[arg(long, value_enum, default_value_t = QuizFormat::Yaml)]
    pub quiz_format: QuizFormat,
    /// Skip downloading resource files, only create the catalog
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_download_resources: bool,
    /// Maximum resource file size to download, in MB
    #[arg(long, default_value_t = crate::constants::udemy::DEFAULT_RESOURCE_SIZE_CAP_MB)]
    pub max_resource_size: u64,
    /// Maximum retry attempts for failed requests
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
    /// Disable retry logic (fail immediately on errors)
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_retry: bool,
    /// Force a fresh extraction, ignoring saved progress
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_resume: bool,
    /// Number of parallel transcript workers (max 5)
    #[arg(long, default_value_t = 2)]
    pub parallel_workers: usize,
    /// Disable parallel downloads (sequential mode)
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_parallel: bool,
    /// Show the guide for exporting session cookies and exit
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub cookies_help: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct YoutubeArgs {
    /// Video or playlist URL
    pub url: String,
    /// Custom output directory (default: video/playlist title)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Only extract transcripts, skip metadata files
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub transcript_only: bool,
    /// Force a fresh extraction, ignoring saved progress
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_resume: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SkillCommand {
    /// Validate a skill directory against authoring rules
    Validate {
        /// Path to the skill directory
        skill_path: PathBuf,
        /// Minimum severity to report
        #[arg(long, value_enum, default_value_t = SeverityArg::Suggestion)]
        min_severity: SeverityArg,
        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        /// Comma-separated list of rule IDs to ignore
        #[arg(long, default_value = "", value_name = "RULES")]
        ignore: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AdrCommand {
    /// Create a new record with the next free number
    Create {
        /// Title, e.g. 'Use PostgreSQL for persistence'
        #[arg(short, long)]
        title: String,
        /// ADR directory (auto-detected if not given)
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Template to use
        #[arg(long, value_enum, default_value_t = AdrTemplate::Minimal)]
        template: AdrTemplate,
        /// Create the ADR directory if it doesn't exist
        #[arg(long, action = clap::ArgAction::SetTrue)]
        create_dir: bool,
    },
    /// Regenerate the README index table
    Index {
        /// ADR directory
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,
        /// Print the index without writing the file
        #[arg(long, action = clap::ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Mark one record as superseded by another
    Supersede {
        /// Number of the record being superseded
        #[arg(long)]
        old: u32,
        /// Number of the superseding record
        #[arg(long)]
        new: u32,
        /// ADR directory
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ResearchCommand {
    /// Print a cached entry as JSON (exit 1 when absent)
    Get {
        /// Topic slug or alias
        slug: String,
    },
    /// Store a research entry
    Put {
        /// Topic slug
        slug: String,
        /// Human-readable title
        #[arg(short, long)]
        title: Option<String>,
        /// Path to the content file (stdin when omitted)
        #[arg(short = 'f', long, value_name = "FILE")]
        content_file: Option<PathBuf>,
        /// Comma-separated aliases
        #[arg(short, long, default_value = "")]
        aliases: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Report whether a topic is cached and still fresh
    Check {
        /// Topic slug or alias
        slug: String,
    },
    /// List all cached entries
    List {
        #[arg(short, long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
    /// Delete a cached entry
    Delete {
        /// Topic slug
        slug: String,
    },
    /// Copy a cached entry into the project docs tier
    Promote {
        /// Topic slug
        slug: String,
        /// Docs directory (default: docs/research)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Refresh an already promoted file, preserving team notes
        #[arg(short, long, action = clap::ArgAction::SetTrue)]
        refresh: bool,
    },
    /// Generate README indexes for the cache and docs tiers
    Index {
        /// Only the cache tier
        #[arg(short, long, action = clap::ArgAction::SetTrue)]
        cache: bool,
        /// Only the docs tier
        #[arg(short, long, action = clap::ArgAction::SetTrue)]
        docs: bool,
        /// Override the docs directory
        #[arg(long, value_name = "DIR")]
        docs_dir: Option<PathBuf>,
        /// Print output without writing files
        #[arg(long, action = clap::ArgAction::SetTrue)]
        dry_run: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct InfographArgs {
    /// Prompt compilation engine
    #[arg(long, value_enum)]
    pub engine: ImageEngine,
    /// Input mode
    #[arg(long, value_enum)]
    pub mode: ImageMode,
    /// Free-text prompt file (text mode)
    #[arg(long, value_name = "FILE", required_if_eq("mode", "text"))]
    pub prompt_file: Option<PathBuf>,
    /// Structured layout JSON file (structured mode)
    #[arg(long, value_name = "FILE", required_if_eq("mode", "structured"))]
    pub layout_file: Option<PathBuf>,
    /// Model name
    #[arg(long, default_value = "gemini-2.5-flash-image")]
    pub model: String,
    /// Output directory for generated images
    #[arg(long, default_value = "./output", value_name = "DIR")]
    pub output_dir: PathBuf,
    /// Basename for saved image files
    #[arg(long, default_value = "infographic")]
    pub basename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_size_default_comes_from_the_shared_constant() {
        let cli = Cli::parse_from(["skolakit", "udemy", "some-course"]);
        let Command::Udemy(args) = cli.command else {
            panic!("expected the udemy subcommand");
        };
        assert_eq!(
            args.max_resource_size,
            crate::constants::udemy::DEFAULT_RESOURCE_SIZE_CAP_MB
        );
    }
}
