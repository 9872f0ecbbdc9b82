//! TUI-less "say" command

use std::error::Error;

use crate::core::config::Config;
use crate::core::dispatcher::TurnError;
use crate::core::session::{ChatSession, SessionOptions};

pub async fn run_say(
    config: &Config,
    options: SessionOptions,
    prompt: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    let mut session = ChatSession::new(config, options)?;

    match session.submit(&prompt).await {
        Ok(reply) => {
            println!("{}", reply.content);
            Ok(())
        }
        Err(TurnError::EmptyInput) => {
            eprintln!("Usage: omnichat say <prompt>");
            std::process::exit(1);
        }
        Err(err) => Err(Box::new(err)),
    }
}
