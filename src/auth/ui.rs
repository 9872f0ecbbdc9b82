use std::fmt;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Yes,
    No,
}

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

fn read_trimmed_line<R: BufRead>(input: &mut R) -> Result<String, UiError> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|err| UiError::new(err.to_string()))?;
    Ok(line.trim().to_string())
}

fn flush_prompt(prompt: &str) -> Result<(), UiError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|err| UiError::new(err.to_string()))
}

pub fn prompt_api_key<R: BufRead>(
    input: &mut R,
    credential_name: &str,
    already_configured: bool,
) -> Result<String, UiError> {
    println!("🔐 Omnichat Authentication Setup");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    if already_configured {
        println!("A key for {credential_name} is already stored; entering a new one replaces it.");
    }
    flush_prompt(&format!("Enter your API key for {credential_name}: "))?;

    let key = read_trimmed_line(input)?;
    if key.is_empty() {
        return Err(UiError::new("API key cannot be empty"));
    }
    Ok(key)
}

pub fn prompt_confirmation<R: BufRead>(
    input: &mut R,
    question: &str,
) -> Result<ConfirmationChoice, UiError> {
    flush_prompt(&format!("{question} [y/N]: "))?;
    let answer = read_trimmed_line(input)?;
    Ok(parse_confirmation(&answer))
}

pub fn parse_confirmation(answer: &str) -> ConfirmationChoice {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => ConfirmationChoice::Yes,
        _ => ConfirmationChoice::No,
    }
}
