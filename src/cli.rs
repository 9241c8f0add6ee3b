//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Majlis portal - membership, attendance and monthly reporting service
#[derive(Parser, Debug)]
#[command(name = "majlis-portal")]
#[command(version)]
#[command(about = "Membership, attendance and monthly reporting service", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Manage sub-user accounts
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Sub-user commands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a sub-user account
    Add {
        /// Login name
        username: String,

        /// Display name (default: the username)
        #[arg(long)]
        name: Option<String>,

        /// Role: admin, regional, majlis or viewer
        #[arg(long, default_value = "viewer")]
        role: String,

        /// Password (not recommended, visible in shell history)
        #[arg(long)]
        password: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,
    },

    /// List sub-user accounts
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_command() {
        let cli = Cli::parse_from(["majlis-portal"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["majlis-portal", "serve", "-c", "/etc/portal.toml"]);
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert_eq!(cli.config.as_deref(), Some("/etc/portal.toml"));
    }

    #[test]
    fn test_user_add() {
        let cli = Cli::parse_from([
            "majlis-portal",
            "user",
            "add",
            "amina",
            "--role",
            "regional",
            "--stdin",
        ]);
        match cli.command {
            Some(Commands::User {
                action:
                    UserCommands::Add {
                        username,
                        role,
                        stdin,
                        password,
                        ..
                    },
            }) => {
                assert_eq!(username, "amina");
                assert_eq!(role, "regional");
                assert!(stdin);
                assert!(password.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
