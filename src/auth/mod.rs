//! `omnichat auth` / `omnichat deauth`: manage the stored API key.

use std::error::Error;
use std::io::{self, BufRead};

use crate::core::keyring::KeyringStore;

mod ui;

use self::ui::{prompt_api_key, prompt_confirmation, ConfirmationChoice, UiError};

fn map_ui_result<T>(result: Result<T, UiError>) -> Result<T, Box<dyn Error>> {
    result.map_err(|err| Box::new(err) as Box<dyn Error>)
}

pub struct AuthManager {
    store: KeyringStore,
    credential_name: String,
}

impl AuthManager {
    pub fn new(credential_name: impl Into<String>) -> Self {
        Self {
            store: KeyringStore::new(),
            credential_name: credential_name.into(),
        }
    }

    pub fn has_stored_key(&self) -> Result<bool, Box<dyn Error>> {
        Ok(self.store.get(&self.credential_name)?.is_some())
    }

    pub fn interactive_auth(&self) -> Result<(), Box<dyn Error>> {
        let stdin = io::stdin();
        self.auth_with_input(&mut stdin.lock())
    }

    fn auth_with_input<R: BufRead>(&self, input: &mut R) -> Result<(), Box<dyn Error>> {
        // A locked keyring should not block replacing the key.
        let configured = self.has_stored_key().unwrap_or(false);
        let key = map_ui_result(prompt_api_key(input, &self.credential_name, configured))?;
        self.store.set(&self.credential_name, &key)?;
        tracing::info!(name = %self.credential_name, "API key stored in keyring");

        println!();
        println!("✅ API key stored securely for {}", self.credential_name);
        println!("Omnichat will now use the backend without environment variables.");
        Ok(())
    }

    pub fn interactive_deauth(&self, assume_yes: bool) -> Result<(), Box<dyn Error>> {
        if !self.has_stored_key()? {
            println!("No API key is stored for {}.", self.credential_name);
            return Ok(());
        }

        if !assume_yes {
            let stdin = io::stdin();
            let question = format!("Remove the stored key for {}?", self.credential_name);
            let choice = map_ui_result(prompt_confirmation(&mut stdin.lock(), &question))?;
            if choice == ConfirmationChoice::No {
                println!("Cancelled.");
                return Ok(());
            }
        }

        self.store.delete(&self.credential_name)?;
        tracing::info!(name = %self.credential_name, "API key removed from keyring");
        println!("✅ Authentication removed for {}", self.credential_name);
        Ok(())
    }
}
