//! Backend credential resolution.
//!
//! The resolver walks an ordered list of [`SecretSource`]s and returns the
//! first non-empty secret. Absence of a key is an ordinary outcome: the
//! dispatcher answers locally instead of calling the backend. Source errors
//! are logged and treated as "not found here".

use std::error::Error;
use std::fmt;

use crate::core::keyring::KeyringStore;

/// API key authorizing backend calls. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendCredential(String);

impl BackendCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BackendCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BackendCredential(<redacted>)")
    }
}

impl fmt::Display for BackendCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// One place a secret may live.
pub trait SecretSource: Send + Sync {
    /// Short label used in logs (never the secret itself).
    fn label(&self) -> &str;

    fn lookup(&self, name: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>>;
}

pub struct KeyringSecretSource {
    store: KeyringStore,
}

impl KeyringSecretSource {
    pub fn new(store: KeyringStore) -> Self {
        Self { store }
    }
}

impl SecretSource for KeyringSecretSource {
    fn label(&self) -> &str {
        "keyring"
    }

    fn lookup(&self, name: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        self.store
            .get(name)
            .map_err(|err| Box::new(err) as Box<dyn Error + Send + Sync>)
    }
}

/// Reads the process environment.
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    fn label(&self) -> &str {
        "environment"
    }

    fn lookup(&self, name: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        Ok(std::env::var(name).ok())
    }
}

pub struct CredentialResolver {
    name: String,
    sources: Vec<Box<dyn SecretSource>>,
}

impl CredentialResolver {
    pub fn new(name: impl Into<String>, sources: Vec<Box<dyn SecretSource>>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }

    /// Keyring first, then the environment variable of the same name.
    pub fn system(name: impl Into<String>) -> Self {
        Self::new(
            name,
            vec![
                Box::new(KeyringSecretSource::new(KeyringStore::new())),
                Box::new(EnvSecretSource),
            ],
        )
    }

    pub fn env_only(name: impl Into<String>) -> Self {
        Self::new(name, vec![Box::new(EnvSecretSource)])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve(&self) -> Option<BackendCredential> {
        for source in &self.sources {
            match source.lookup(&self.name) {
                Ok(Some(secret)) if !secret.trim().is_empty() => {
                    tracing::debug!(source = source.label(), name = %self.name, "credential found");
                    return Some(BackendCredential::new(secret.trim()));
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        source = source.label(),
                        name = %self.name,
                        error = %err,
                        "credential lookup failed; trying next source"
                    );
                }
            }
        }
        tracing::debug!(name = %self.name, "no credential configured");
        None
    }
}
