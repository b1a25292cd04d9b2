//! Promptsmith CLI - Build, export and refine structured prompts
//!
//! Edits a prompt file, renders it in every supported notation, keeps
//! snapshots in a local library and asks a provider for a refined version.

mod config;
mod prompt_file;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Password;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use promptsmith::{
    CredentialStore, Direction, DocumentField, FileStore, GenerationService,
    HttpGenerationProvider, ListField, ListOp, OutputFormat, PromptDocument, PromptSession,
    Provider, ProviderCredentials,
};

use config::Config;

type CliSession = PromptSession<FileStore, HttpGenerationProvider>;

#[derive(Parser)]
#[command(name = "promptsmith")]
#[command(about = "Promptsmith CLI - Build, export and refine structured prompts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty prompt file
    New {
        /// Prompt file to create
        file: PathBuf,
        /// Optional title
        #[arg(short, long)]
        title: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Set a text field (title, role, task, audience, style, tone)
    Set {
        file: PathBuf,
        field: DocumentField,
        value: String,
    },

    /// Set a sampling parameter (temperature, top_p, max_tokens, presence_penalty, frequency_penalty)
    Param {
        file: PathBuf,
        name: String,
        value: String,
    },

    /// Edit a list (constraints, steps, inputs, examples)
    Item {
        file: PathBuf,
        list: ListField,
        #[command(subcommand)]
        action: ItemAction,
    },

    /// Print the prompt in one notation
    Show {
        file: PathBuf,
        /// Output format: markdown, json, yaml, smile
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Write all four notations next to each other
    Export {
        file: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// File name stem for the artifacts
        #[arg(long, default_value = "prompt")]
        stem: String,
    },

    /// Manage saved prompts
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },

    /// Store an API key (and optional base URL) for a provider
    Login {
        /// Provider: openai, anthropic, google
        #[arg(short, long)]
        provider: Option<Provider>,
        /// API key (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,
        /// Base URL override, e.g. a local OpenAI-compatible server
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Ask a provider to refine the prompt
    Generate {
        file: PathBuf,
        /// Output format: markdown, json, yaml, smile
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Provider: openai, anthropic, google
        #[arg(short, long)]
        provider: Option<Provider>,
        /// Write the refined text here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ItemAction {
    /// Append an item
    Add { value: String },
    /// Remove the item at a 1-based position
    Remove { index: usize },
    /// Swap an item with its neighbor (up or down)
    Move { index: usize, direction: Direction },
    /// Replace the item at a 1-based position
    Set { index: usize, value: String },
}

#[derive(Subcommand)]
enum LibraryAction {
    /// List saved prompts, newest first
    List,
    /// Save a prompt file to the library
    Save {
        file: PathBuf,
        /// Entry title (defaults to the prompt title)
        #[arg(short, long)]
        title: Option<String>,
        /// Update this entry instead of creating a new one
        #[arg(long)]
        id: Option<String>,
    },
    /// Write a saved prompt to a file
    Load {
        id: String,
        file: PathBuf,
    },
    /// Copy a saved prompt
    Duplicate { id: String },
    /// Rename a saved prompt
    Rename { id: String, title: String },
    /// Delete a saved prompt
    Delete { id: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set provider, format, schema, timeout, id_source, model or data_dir
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::New { file, title, force } => cmd_new(file, title, force),
        Commands::Set { file, field, value } => cmd_set(file, field, value),
        Commands::Param { file, name, value } => cmd_param(file, &name, &value),
        Commands::Item { file, list, action } => cmd_item(file, list, action),
        Commands::Show { file, format } => cmd_show(file, format),
        Commands::Export { file, out_dir, stem } => cmd_export(file, out_dir, &stem),
        Commands::Library { action } => cmd_library(action),
        Commands::Login { provider, key, base_url } => cmd_login(provider, key, base_url),
        Commands::Generate { file, format, provider, out } => {
            cmd_generate(file, format, provider, out).await
        }
        Commands::Config { action } => cmd_config(action.unwrap_or(ConfigAction::Show)),
    }
}

// ============================================
// Session wiring
// ============================================

fn open_store(config: &Config) -> Result<Arc<FileStore>> {
    let dir = config.data_dir()?;
    let store = FileStore::open(&dir)
        .with_context(|| format!("Failed to open data directory {:?}", dir))?;
    tracing::debug!("Using data directory {:?}", dir);
    Ok(Arc::new(store))
}

fn open_session(config: &Config, provider: Provider) -> Result<CliSession> {
    let store = open_store(config)?;
    let http = HttpGenerationProvider::new(provider).with_model(config.model_for(provider));
    let generation = GenerationService::new(Arc::new(http)).with_timeout(config.timeout());

    Ok(PromptSession::with_services(
        promptsmith::LibraryService::new(store.clone()).with_id_source(config.id_source),
        CredentialStore::new(store),
        generation,
    )
    .with_schema(config.schema))
}

/// Stored credentials, falling back to the provider's environment variable
fn resolve_credentials(session: &CliSession, provider: Provider) -> ProviderCredentials {
    let mut credentials = session.credentials().get(provider);
    if credentials.api_key().is_none() {
        credentials.api_key = std::env::var(provider.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty());
    }
    credentials
}

/// Convert a 1-based position from the command line
fn position(index: usize) -> Result<usize> {
    index.checked_sub(1).context("Positions start at 1")
}

// ============================================
// Command Implementations
// ============================================

fn cmd_new(file: PathBuf, title: Option<String>, force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!("{:?} already exists (use --force to overwrite)", file);
    }

    let mut doc = PromptDocument::new();
    if let Some(title) = title {
        doc.set_field(DocumentField::Title, title);
    }
    prompt_file::write(&file, &doc)?;

    println!("{} Created {:?}", "✓".green(), file);
    Ok(())
}

fn cmd_set(file: PathBuf, field: DocumentField, value: String) -> Result<()> {
    let mut doc = prompt_file::read(&file)?;
    doc.set_field(field, value);
    prompt_file::write(&file, &doc)?;
    println!("{} Updated {:?}", "✓".green(), field);
    Ok(())
}

fn cmd_param(file: PathBuf, name: &str, value: &str) -> Result<()> {
    let mut doc = prompt_file::read(&file)?;
    let params = &mut doc.parameters;

    let parse_float = |v: &str| -> Result<f64> {
        v.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .with_context(|| format!("'{}' is not a number", v))
    };

    match name {
        "temperature" => params.temperature = parse_float(value)?,
        "top_p" | "top-p" => params.top_p = parse_float(value)?,
        "max_tokens" | "max-tokens" => {
            params.max_tokens = value
                .parse()
                .with_context(|| format!("'{}' is not a token count", value))?
        }
        "presence_penalty" | "presence-penalty" => params.presence_penalty = parse_float(value)?,
        "frequency_penalty" | "frequency-penalty" => {
            params.frequency_penalty = parse_float(value)?
        }
        other => bail!("Unknown parameter '{}'", other),
    }

    prompt_file::write(&file, &doc)?;
    println!("{} {} = {}", "✓".green(), name, value);
    Ok(())
}

fn cmd_item(file: PathBuf, list: ListField, action: ItemAction) -> Result<()> {
    let mut doc = prompt_file::read(&file)?;

    let op = match action {
        ItemAction::Add { value } => ListOp::Add(value),
        ItemAction::Remove { index } => ListOp::RemoveAt(position(index)?),
        ItemAction::Move { index, direction } => ListOp::MoveAt(position(index)?, direction),
        ItemAction::Set { index, value } => ListOp::SetAt(position(index)?, value),
    };

    if !doc.apply_list_op(list, op) {
        println!("{} Nothing changed in {}", "!".yellow(), list);
        return Ok(());
    }
    prompt_file::write(&file, &doc)?;

    println!("{}", format!("{}:", list).bold());
    for (i, item) in doc.list(list).iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).dimmed(), item);
    }
    Ok(())
}

fn cmd_show(file: PathBuf, format: Option<OutputFormat>) -> Result<()> {
    let config = Config::load()?;
    let doc = prompt_file::read(&file)?;
    let format = format.unwrap_or(config.format);

    let shape = doc.to_export_shape(config.schema);
    println!("{}", promptsmith::formatters::render(format, &shape));
    Ok(())
}

fn cmd_export(file: PathBuf, out_dir: PathBuf, stem: &str) -> Result<()> {
    let config = Config::load()?;
    let doc = prompt_file::read(&file)?;
    let shape = doc.to_export_shape(config.schema);

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {:?}", out_dir))?;

    for format in OutputFormat::ALL {
        let path = out_dir.join(format!("{}.{}", stem, format.extension()));
        let content = promptsmith::formatters::render(format, &shape);
        fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        println!("{} {} {:?}", "✓".green(), format.label(), path);
    }
    Ok(())
}

fn cmd_library(action: LibraryAction) -> Result<()> {
    let config = Config::load()?;
    let mut session = open_session(&config, config.provider)?;

    match action {
        LibraryAction::List => {
            let entries = session.entries();
            if entries.is_empty() {
                println!("Library is empty.");
                println!("\n{}", "Save a prompt with:".dimmed());
                println!("  promptsmith library save <file>");
                return Ok(());
            }

            println!("{}", "Library:".bold());
            for entry in entries {
                println!(
                    "  {} {} {}",
                    entry.id.dimmed(),
                    entry.title.cyan(),
                    entry
                        .updated_at
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                        .dimmed()
                );
            }
        }

        LibraryAction::Save { file, title, id } => {
            let doc = prompt_file::read(&file)?;
            if let Some(id) = &id {
                session.load(id)?;
            }
            *session.document_mut() = doc;

            let saved = session.save(title.as_deref())?;
            let verb = if id.as_deref() == Some(saved.as_str()) { "Updated" } else { "Saved" };
            println!("{} {} {}", "✓".green(), verb, saved.cyan());
        }

        LibraryAction::Load { id, file } => {
            session.load(&id)?;
            prompt_file::write(&file, session.document())?;
            println!("{} Loaded {} into {:?}", "✓".green(), id.cyan(), file);
        }

        LibraryAction::Duplicate { id } => match session.duplicate(&id)? {
            Some(copy) => println!("{} Duplicated as {}", "✓".green(), copy.cyan()),
            None => bail!("Entry '{}' not found", id),
        },

        LibraryAction::Rename { id, title } => {
            if !session.rename(&id, &title)? {
                bail!("Entry '{}' not found", id);
            }
            println!("{} Renamed {} to '{}'", "✓".green(), id.cyan(), title);
        }

        LibraryAction::Delete { id } => {
            if !session.delete(&id)? {
                bail!("Entry '{}' not found", id);
            }
            println!("{} Deleted {}", "✓".green(), id.cyan());
        }
    }

    Ok(())
}

fn cmd_login(provider: Option<Provider>, key: Option<String>, base_url: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let provider = provider.unwrap_or(config.provider);
    let store = open_store(&config)?;
    let credentials = CredentialStore::new(store);

    let api_key = match key {
        Some(k) => k,
        None => Password::new()
            .with_prompt(format!("{} API key", provider))
            .interact()
            .context("Failed to read API key")?,
    };

    credentials.set_api_key(provider, &api_key)?;
    if let Some(url) = base_url {
        credentials.set_base_url(provider, &url)?;
    }

    println!(
        "{} Credentials for {} saved to {:?}",
        "✓".green(),
        provider.to_string().cyan(),
        config.data_dir()?
    );
    println!("{}", "Stored as plain text; protect this directory.".yellow());
    Ok(())
}

async fn cmd_generate(
    file: PathBuf,
    format: Option<OutputFormat>,
    provider: Option<Provider>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load()?;
    let provider = provider.unwrap_or(config.provider);
    let format = format.unwrap_or(config.format);

    let mut session = open_session(&config, provider)?;
    *session.document_mut() = prompt_file::read(&file)?;

    let credentials = resolve_credentials(&session, provider);
    let prepared = session
        .generation()
        .prepare(format, &session.export_shape(), credentials)?;

    eprintln!(
        "{} {} with {} ({})...",
        "Refining".dimmed(),
        format.label().green(),
        provider.to_string().cyan(),
        config.model_for(provider).dimmed()
    );

    let text = match prepared.run().await {
        Ok(text) => text,
        Err(e) if e.is_retryable() => bail!("{} (retryable)", e),
        Err(e) => return Err(e.into()),
    };

    match out {
        Some(path) => {
            fs::write(&path, format!("{}\n", text))
                .with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("{} Wrote {:?}", "✓".green(), path);
        }
        None => println!("{}", session.preview(format)),
    }

    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut config = Config::load()?;

    match action {
        ConfigAction::Show => {
            println!("{}", "Configuration:".bold());
            println!("  Path: {:?}", Config::config_path()?);
            println!("  Data dir: {:?}", config.data_dir()?);
            println!("  Provider: {}", config.provider.to_string().cyan());
            println!("  Model: {}", config.model_for(config.provider));
            println!("  Format: {}", config.format);
            println!("  Schema: {:?}", config.schema);
            println!("  Timeout: {}s", config.timeout_secs);
            println!("  Id source: {:?}", config.id_source);

            let store = open_store(&config)?;
            let credentials = CredentialStore::new(store);
            for provider in Provider::ALL {
                let stored = credentials.get(provider);
                let status = if stored.api_key().is_some() {
                    "Set".green()
                } else if std::env::var(provider.api_key_env()).is_ok() {
                    format!("From {}", provider.api_key_env()).yellow()
                } else {
                    "Not set".red()
                };
                println!("  {} API Key: {}", provider, status);
            }
        }

        ConfigAction::Set { key, value } => {
            match key.as_str() {
                "provider" => config.provider = value.parse().map_err(anyhow::Error::msg)?,
                "format" => config.format = value.parse().map_err(anyhow::Error::msg)?,
                "schema" => config.schema = value.parse().map_err(anyhow::Error::msg)?,
                "timeout" | "timeout_secs" => {
                    config.timeout_secs = value
                        .parse()
                        .with_context(|| format!("'{}' is not a number of seconds", value))?
                }
                "id_source" => config.id_source = value.parse().map_err(anyhow::Error::msg)?,
                "model" => config.set_model(config.provider, value.clone()),
                "data_dir" => config.data_dir = Some(PathBuf::from(&value)),
                other => bail!("Unknown config key '{}'", other),
            }
            config.save()?;
            println!("{} {} = {}", "✓".green(), key, value);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_one_based() {
        assert_eq!(position(1).unwrap(), 0);
        assert!(position(0).is_err());
    }

    #[test]
    fn test_cli_parses_item_move() {
        let cli = Cli::try_parse_from([
            "promptsmith",
            "item",
            "prompt.json",
            "steps",
            "move",
            "2",
            "up",
        ])
        .unwrap();

        match cli.command {
            Commands::Item { list, action, .. } => {
                assert_eq!(list, ListField::Steps);
                assert!(matches!(
                    action,
                    ItemAction::Move {
                        index: 2,
                        direction: Direction::Up
                    }
                ));
            }
            _ => panic!("expected item command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["promptsmith", "show", "p.json", "-f", "toml"]).is_err());
    }
}
