//! Command-line definition.

use clap::{Parser, Subcommand};
use nc_protocol::Language;
use std::path::PathBuf;

/// Build and run single-file programs in C, C++, Java, Python and R
#[derive(Parser)]
#[command(name = "nocopy", version, about, long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Print every event as one JSON line instead of console text
    #[arg(long, global = true)]
    pub json: bool,

    /// Project root holding .nocopy/config.toml (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a source file and report the result
    Build {
        /// Source file to build
        file: PathBuf,

        /// Language of the file (detected from the extension if omitted)
        #[arg(short, long)]
        lang: Option<Language>,
    },
    /// Build a source file and run it, streaming its output
    Run {
        /// Source file to run
        file: PathBuf,

        /// Language of the file (detected from the extension if omitted)
        #[arg(short, long)]
        lang: Option<Language>,
    },
    /// Print the boilerplate template of a language
    Template {
        /// Language tag; unknown tags print the C++ template
        lang: String,
    },
    /// Create Program_<N> with the template of a language
    New {
        lang: Language,

        /// Directory to create the file in
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// List supported languages
    Languages,
}
