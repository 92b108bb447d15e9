//! Command-line interface
//!
//! `finitura` runs the HTTP server when invoked without a subcommand.
//! The subcommands cover operator tasks that work directly against the
//! database and filesystem, no running server needed.

use std::fmt;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::errors::FinituraError;
use crate::storage::{NewAdmin, StorageFactory};
use crate::utils::is_valid_email;
use crate::utils::password::{check_password_strength, hash_password};

/// Storefront and analytics backend for a decorative-painting studio
#[derive(Parser)]
#[command(name = "finitura")]
#[command(version)]
#[command(about = "Storefront and analytics backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default when no command is given)
    Serve,

    /// Create an admin account directly in the database
    ///
    /// Bootstrap and recovery path; bypasses the registration code the
    /// HTTP endpoint requires.
    CreateAdmin {
        /// Display name
        #[arg(long)]
        name: String,

        /// Login email (stored lowercased)
        #[arg(long)]
        email: String,

        /// Password; read from FINITURA_ADMIN_PASSWORD when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Write an example configuration file
    ConfigGen {
        /// Output path (default: finitura.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    CommandError(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            CliError::CommandError(msg) => write!(f, "Command error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<FinituraError> for CliError {
    fn from(err: FinituraError) -> Self {
        CliError::StorageError(err.to_string())
    }
}

/// `create-admin`: validate, hash and insert one admin row
pub async fn create_admin(
    name: String,
    email: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = password
        .or_else(|| std::env::var("FINITURA_ADMIN_PASSWORD").ok())
        .ok_or_else(|| {
            CliError::CommandError(
                "No password given. Pass --password or set FINITURA_ADMIN_PASSWORD".to_string(),
            )
        })?;

    if name.chars().count() < 2 || name.chars().count() > 50 {
        return Err(CliError::CommandError(
            "Name must be between 2 and 50 characters".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(CliError::CommandError(format!(
            "Invalid email address: {}",
            email
        )));
    }
    check_password_strength(&password).map_err(CliError::CommandError)?;

    let password_hash = hash_password(&password).map_err(|e| CliError::CommandError(e.to_string()))?;

    // Connects and runs pending migrations, so this works on a fresh database
    let storage = StorageFactory::create().await?;

    let admin = storage
        .insert_admin(NewAdmin {
            name,
            email,
            password_hash,
        })
        .await?;

    println!("Admin account created: {} <{}>", admin.name, admin.email);
    Ok(())
}

/// `config-gen`: write the commented example configuration
pub fn generate_config(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| "finitura.example.toml".to_string());

    if std::path::Path::new(&path).exists() && !force {
        return Err(CliError::CommandError(format!(
            "{} already exists. Use --force to overwrite",
            path
        )));
    }

    std::fs::write(&path, AppConfig::generate_sample_config())
        .map_err(|e| CliError::CommandError(format!("Failed to write {}: {}", path, e)))?;

    println!("Example configuration written to {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_admin_parses() {
        let cli = Cli::parse_from([
            "finitura",
            "create-admin",
            "--name",
            "Ada",
            "--email",
            "ada@studio.test",
            "--password",
            "Correct1Horse",
        ]);
        match cli.command {
            Some(Commands::CreateAdmin { name, email, password }) => {
                assert_eq!(name, "Ada");
                assert_eq!(email, "ada@studio.test");
                assert_eq!(password.as_deref(), Some("Correct1Horse"));
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn test_no_command_defaults_to_server() {
        let cli = Cli::parse_from(["finitura"]);
        assert!(cli.command.is_none());
    }
}
