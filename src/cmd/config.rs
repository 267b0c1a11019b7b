use std::io::{self, Write};

use clap::{Args, Subcommand};
use tracing::info;
use url::Url;

use crate::config::{StoredConfig, config_file_path};
use crate::error::AppResult;
use crate::infra::dutycalls::DEFAULT_API_URL;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring dutycalls-notify.");
    println!("Press Enter to keep the current value, '-' to clear optional ones.");
    println!("The password is stored in the local config file; protect it accordingly.");
    println!();

    ask("Default DutyCalls channel", &mut cfg.default_channel, Field::Required)?;
    ask("DutyCalls username", &mut cfg.username, Field::Required)?;
    ask("DutyCalls password", &mut cfg.password, Field::Secret)?;
    ask(
        &format!("API URL (default {DEFAULT_API_URL})"),
        &mut cfg.api_url,
        Field::ApiUrl,
    )?;

    cfg.save()?;

    let path = config_file_path()?;
    info!(path = %path.display(), "configuration saved");
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Default channel: {}", display_value(&cfg.default_channel));
    println!("Username: {}", display_value(&cfg.username));
    println!("Password: {}", mask_secret(&cfg.password));
    println!(
        "API URL: {}",
        cfg.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    );

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Required,
    Secret,
    ApiUrl,
}

/// Asks until the answer is acceptable for `field`, then stores it in `target`.
fn ask(label: &str, target: &mut Option<String>, field: Field) -> AppResult<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let hint = match (target.as_deref(), field) {
            (Some(_), Field::Secret) => " [****]".to_string(),
            (Some(value), _) => format!(" [{value}]"),
            (None, _) => String::new(),
        };
        write!(stdout, "{label}{hint}: ")?;
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            return Ok(());
        }

        match interpret(input.trim(), target.is_some(), field) {
            Ok(Answer::Keep) => return Ok(()),
            Ok(Answer::Clear) => {
                *target = None;
                return Ok(());
            }
            Ok(Answer::Set(value)) => {
                *target = Some(value);
                return Ok(());
            }
            Err(reason) => println!("  {reason}"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Keep,
    Clear,
    Set(String),
}

fn interpret(input: &str, has_value: bool, field: Field) -> Result<Answer, String> {
    let required = matches!(field, Field::Required | Field::Secret);
    match input {
        "" if required && !has_value => Err("a value is required".to_string()),
        "" => Ok(Answer::Keep),
        "-" if required => Err("this value cannot be cleared".to_string()),
        "-" => Ok(Answer::Clear),
        url if field == Field::ApiUrl => match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                Ok(Answer::Set(url.trim_end_matches('/').to_string()))
            }
            Ok(_) => Err("the API URL must use http or https".to_string()),
            Err(err) => Err(format!("invalid URL: {err}")),
        },
        value => Ok(Answer::Set(value.to_string())),
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(secret) if !secret.is_empty() => "*".repeat(secret.chars().count().min(8)),
        _ => "<not set>".to_string(),
    }
}
