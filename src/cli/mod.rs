//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;

#[cfg(test)]
mod tests;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::auth::AuthManager;
use crate::cli::say::run_say;
use crate::core::config::keys::ConfigKey;
use crate::core::config::Config;
use crate::core::session::SessionOptions;
use crate::logging::init_tracing;
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "omnichat")]
#[command(version)]
#[command(about = "A terminal chat interface for OpenAI-compatible APIs")]
#[command(
    long_about = "Omnichat is a full-screen terminal chat interface. Each message you send is \
answered by an OpenAI-compatible backend when an API key is available, or by a local demo \
reply when it is not.\n\n\
Authentication:\n\
  Use 'omnichat auth' to store the API key in your system keyring.\n\n\
Environment Variables (fallback if no key is stored):\n\
  OPENAI_API_KEY       Your OpenAI API key\n\
  OMNICHAT_CONFIG_DIR  Directory holding config.toml (optional)\n\
  OMNICHAT_LOG         Tracing filter used with --trace-log (optional)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this session
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Append the transcript to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Read the API key from the environment only, skipping the keyring
    #[arg(long, global = true)]
    pub env_only: bool,

    /// Write diagnostic tracing output to the specified file
    #[arg(long, global = true, value_name = "FILE")]
    pub trace_log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send a single message and print the reply
    Say {
        /// Message text (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Store the API key in the system keyring
    Auth,
    /// Remove the API key from the system keyring
    Deauth {
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the effective configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.trace_log.as_deref())?;

    let options = SessionOptions {
        model: args.model,
        log_file: args.log,
        env_only: args.env_only,
    };

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = Config::load()?;
            run_chat(&config, options).await
        }
        Commands::Say { prompt } => {
            let config = Config::load()?;
            run_say(&config, options, prompt).await
        }
        Commands::Auth => {
            let config = Config::load()?;
            let auth_manager = AuthManager::new(config.credential_name());
            if let Err(e) = auth_manager.interactive_auth() {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth { yes } => {
            let config = Config::load()?;
            let auth_manager = AuthManager::new(config.credential_name());
            if let Err(e) = auth_manager.interactive_deauth(yes) {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let value = value.join(" ");
            match apply_set(&mut config, &key, &value) {
                Ok(key) => {
                    config.save()?;
                    println!("✅ Set {} to: {}", key.as_str(), value.trim());
                    Ok(())
                }
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match key.parse::<ConfigKey>() {
                Ok(key) => {
                    config.unset_value(key);
                    config.save()?;
                    println!("✅ Unset {}", key.as_str());
                    Ok(())
                }
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config => {
            let config = Config::load()?;
            config.print_all();
            Ok(())
        }
    }
}

fn apply_set(config: &mut Config, key: &str, value: &str) -> Result<ConfigKey, Box<dyn Error>> {
    let key = key.parse::<ConfigKey>()?;
    config.set_value(key, value)?;
    Ok(key)
}
