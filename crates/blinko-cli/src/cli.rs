use std::path::PathBuf;

use blinko_core::models::NoteSortConfig;
use blinko_core::NoteId;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "blinko")]
#[command(about = "Reorder and edit Blinko notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Session settings file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List notes in display order
    List {
        /// Number of notes to show (defaults to the session page size)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Filter notes by tag name
        #[arg(long)]
        tag: Option<String>,
        /// Sort preset, e.g. createdAt-desc or updatedAt-asc
        #[arg(long, value_parser = parse_sort)]
        sort: Option<NoteSortConfig>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content
        content: Vec<String>,
    },
    /// Move a note to the position of another note
    Move {
        /// Note to move
        id: NoteId,
        /// Note whose position it takes
        #[arg(long, value_name = "ID")]
        onto: NoteId,
    },
    /// Manage unsaved edits
    Draft {
        #[command(subcommand)]
        command: DraftCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[derive(Subcommand)]
pub enum DraftCommands {
    /// Store a draft (opens $EDITOR when no content is given)
    Set {
        id: NoteId,
        content: Vec<String>,
    },
    /// Print a note's draft, or its saved content when there is none
    Show { id: NoteId },
    /// Save a note's draft to the server
    Commit { id: NoteId },
    /// Throw away a note's draft
    Discard { id: NoteId },
    /// List stored drafts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Blinko server URL
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
        /// API token, stored in the system keychain
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

fn parse_sort(value: &str) -> Result<NoteSortConfig, String> {
    value.parse().map_err(|error: blinko_core::Error| error.to_string())
}
