//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for persona-notes.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Persona Notes - persona profiles and multi-persona note generation
///
/// Create personas, pick one or more of them, and generate social notes
/// written from each persona's point of view.
#[derive(Parser, Debug)]
#[command(name = "persona-notes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "PNOTES_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored personas
    Persona {
        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },

    /// Generate notes for one or more personas
    Note {
        #[command(subcommand)]
        subcommand: NoteSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonaSubcommand {
    /// List stored personas
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate and store a new persona
    Create {
        /// Who the content is aimed at
        #[arg(long)]
        target_audience: String,

        /// Audience category
        #[arg(long)]
        audience_category: String,

        /// Number of reference accounts to sample
        #[arg(long, default_value_t = 60)]
        num_id: u32,

        /// Number of posts sampled per reference account
        #[arg(long, default_value_t = 5)]
        num_content: u32,

        /// File with one reference tag per line (defaults to the built-in list)
        #[arg(long)]
        reference_tags: Option<PathBuf>,
    },

    /// Show one persona in full
    Show {
        id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one or more personas
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Mark a persona as the one later commands act on
    Select { id: String },

    /// Show the selected persona
    Selected,

    /// Clear the selected persona
    Unselect,
}

/// Options shared by every note kind
#[derive(Args, Debug, Clone)]
pub struct NoteArgs {
    /// Persona to generate for (repeatable; defaults to the selected persona)
    #[arg(short, long = "persona", value_name = "ID")]
    pub personas: Vec<String>,

    /// Copy each generated note to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Print notes as JSON
    #[arg(long)]
    pub json: bool,
}

/// Note subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum NoteSubcommand {
    /// Big-text poster notes
    Poster {
        #[command(flatten)]
        args: NoteArgs,
    },

    /// Image notes with a cover picture
    Image {
        /// Image search keyword
        #[arg(short, long)]
        keyword: String,

        /// Save each note's image into the download directory
        #[arg(long)]
        download: bool,

        #[command(flatten)]
        args: NoteArgs,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate,
}
