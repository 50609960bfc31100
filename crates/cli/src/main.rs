mod cli;
mod commands;
mod render;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so that program output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build { file, lang } => {
            commands::build_command(&file, lang, &root, cli.json, false).await
        }
        Commands::Run { file, lang } => {
            commands::build_command(&file, lang, &root, cli.json, true).await
        }
        Commands::Template { lang } => {
            commands::template_command(&lang);
            Ok(())
        }
        Commands::New { lang, dir } => commands::new_command(lang, &dir),
        Commands::Languages => commands::languages_command(cli.json),
    }
}
