//! Subcommand implementations.

use crate::render::Renderer;
use color_eyre::eyre::{eyre, Result, WrapErr};
use colored::Colorize;
use nc_core::config::load_config;
use nc_core::registry::{descriptor_for, template_for_tag};
use nc_core::scaffold::{create_program_file, file_extension};
use nc_core::state::Workbench;
use nc_protocol::Language;
use std::path::Path;
use tokio::sync::mpsc;

/// Build `file`, and run it when `run` is set.
///
/// The outcome of the user's program never fails the command: compile
/// errors, missing toolchains and nonzero exits are all reported on the
/// console and the command still succeeds.
pub async fn build_command(
    file: &Path,
    lang: Option<Language>,
    root: &Path,
    json: bool,
    run: bool,
) -> Result<()> {
    let language = detect_language(file, lang)?;
    let source = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let config = load_config(root)?;

    tracing::debug!(file = %file.display(), language = %language, "building");

    let (events_tx, events_rx) = mpsc::channel(256);
    let renderer = Renderer {
        json,
        announce_success: !run,
    };
    let printer = tokio::spawn(renderer.drain(events_rx));

    let workbench = Workbench::new(config, events_tx);
    workbench.build(language, &source).await;
    if run {
        // a refusal or launch failure has already been sent as a Notice
        let _ = workbench.run().await;
    }

    // The channel closes once the run's forwarding task is done as well.
    drop(workbench);
    printer.await?;
    Ok(())
}

pub fn template_command(tag: &str) {
    print!("{}", template_for_tag(tag));
}

pub fn new_command(language: Language, dir: &Path) -> Result<()> {
    let path = create_program_file(dir, language)?;
    println!("{} {}", "Created".green().bold(), path.display());
    Ok(())
}

pub fn languages_command(json: bool) -> Result<()> {
    if json {
        let list: Vec<_> = Language::ALL
            .iter()
            .map(|language| {
                let (label, patterns) = language.file_filters();
                serde_json::json!({
                    "name": language.name(),
                    "extension": file_extension(*language),
                    "compiled": descriptor_for(*language).is_compiled(),
                    "filter": { "label": label, "patterns": patterns },
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for language in Language::ALL {
        let kind = if descriptor_for(language).is_compiled() {
            "compiled"
        } else {
            "interpreted"
        };
        let (_, patterns) = language.file_filters();
        println!(
            "{:<8} {:<12} {}",
            language.name().bold(),
            kind,
            patterns.join(" ")
        );
    }
    Ok(())
}

fn detect_language(file: &Path, lang: Option<Language>) -> Result<Language> {
    lang.or_else(|| Language::from_path(file)).ok_or_else(|| {
        eyre!(
            "Cannot detect the language of {}; pass --lang",
            file.display()
        )
    })
}
