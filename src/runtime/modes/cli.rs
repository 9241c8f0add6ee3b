//! CLI mode
//!
//! One-shot commands that share the service layer with the HTTP server.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::cli::{ConfigCommands, UserCommands};
use crate::config::StaticConfig;
use crate::runtime::lifetime;
use crate::services::CreateUserRequest;

const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

pub async fn run_config_command(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Generate { output_path, force } => {
            let path = output_path.unwrap_or_else(|| DEFAULT_SAMPLE_PATH.to_string());
            if Path::new(&path).exists() && !force {
                bail!("{} already exists, use --force to overwrite", path);
            }
            StaticConfig::default()
                .save_to_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
            println!("{} Sample configuration written to {}", "✓".green().bold(), path);
            Ok(())
        }
    }
}

pub async fn run_user_command(action: UserCommands) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup().await?;
    let users = startup.services.users.clone();

    let result = match action {
        UserCommands::Add {
            username,
            name,
            role,
            password,
            stdin,
        } => {
            let password = read_password(password, stdin)?;
            let user = users
                .create_user(CreateUserRequest {
                    name: name.unwrap_or_else(|| username.clone()),
                    role: Some(role),
                    username,
                    password,
                })
                .await
                .map_err(|e| anyhow::anyhow!(e.format_colored()))?;
            println!(
                "{} Created {} ({}) with id {}",
                "✓".green().bold(),
                user.username.cyan(),
                user.role.as_ref(),
                user.id
            );
            Ok(())
        }
        UserCommands::List => {
            let list = users
                .list_users()
                .await
                .map_err(|e| anyhow::anyhow!(e.format_simple()))?;
            if list.is_empty() {
                println!("{}", "No sub-users".dimmed());
            }
            for user in list {
                println!(
                    "{:>4}  {:<20} {:<10} {}",
                    user.id,
                    user.username.cyan(),
                    user.role.as_ref(),
                    user.name
                );
            }
            Ok(())
        }
    };

    if let Err(e) = startup.storage.close().await {
        tracing::warn!("Failed to close database: {}", e);
    }
    result
}

/// 从参数、stdin 或交互式输入获取密码
fn read_password(password: Option<String>, stdin: bool) -> Result<String> {
    if stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }
    if let Some(password) = password {
        return Ok(password);
    }
    if !io::stdin().is_terminal() {
        bail!("No password provided. Use --password or --stdin, or run interactively.");
    }

    print!("Enter password: ");
    io::stdout().flush()?;
    let password = rpassword::read_password().context("Failed to read password")?;

    print!("Confirm password: ");
    io::stdout().flush()?;
    let confirm = rpassword::read_password().context("Failed to read password")?;

    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}
