//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "promptlint",
    version,
    about = "Promptlint — prompt quality scanner",
    long_about = "Promptlint — scan directories of prompt files for missing sections, PII/secrets, and semantically redundant or contradictory instructions, with optional mechanical fixes.\n\nConfiguration precedence: CLI > promptlint.toml > defaults.",
    after_help = "Examples:\n  promptlint scan prompts/\n  promptlint scan prompts/ --output json\n  promptlint scan prompts/ --fix --yes\n  promptlint scan prompts/ --no-semantic\n  promptlint rules",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for scanning and rule introspection.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current promptlint version."
    )]
    Version,
    /// Scan prompt files and optionally fix them
    #[command(
        about = "Scan a directory of prompt files",
        long_about = "Validate every file with the configured extension in a directory, report the issues, and optionally apply mechanical fixes after confirmation.",
        after_help = "Examples:\n  promptlint scan prompts/\n  promptlint scan prompts/ --fix\n  promptlint scan prompts/ --output json --no-semantic"
    )]
    Scan {
        #[arg(help = "Directory to scan (default: config `dir` or current dir)")]
        directory: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Apply suggested fixes after scanning")]
        fix: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip the confirmation prompt before fixing")]
        yes: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "File extension to scan (default: txt)")]
        extension: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable model-backed semantic rules")]
        no_semantic: bool,
    },
    /// List registered rules
    #[command(
        about = "List rules",
        long_about = "List the ids and descriptions of all registered validation rules."
    )]
    Rules,
}
