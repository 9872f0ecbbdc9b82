use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

use tempfile::TempDir;

use crate::core::config::io::CONFIG_DIR_ENV;

fn env_lock() -> &'static Mutex<()> {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

/// Serializes environment mutation across tests and restores every touched
/// variable when dropped.
pub struct TestEnvVarGuard {
    saved: HashMap<String, Option<OsString>>,
    _lock: Option<MutexGuard<'static, ()>>,
}

impl TestEnvVarGuard {
    pub fn new() -> Self {
        let lock = env_lock()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self {
            saved: HashMap::new(),
            _lock: Some(lock),
        }
    }

    // Used inside `with_test_config_env`, which already holds the lock.
    fn unlocked() -> Self {
        Self {
            saved: HashMap::new(),
            _lock: None,
        }
    }

    fn remember(&mut self, key: &str) {
        self.saved
            .entry(key.to_string())
            .or_insert_with(|| std::env::var_os(key));
    }

    pub fn set_var(&mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) {
        self.remember(key);
        std::env::set_var(key, value);
    }

    pub fn remove_var(&mut self, key: &str) {
        self.remember(key);
        std::env::remove_var(key);
    }
}

impl Default for TestEnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestEnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain() {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// Runs `f` with the config directory pointed at a fresh temp dir.
///
/// The closure gets its own env guard so it can set further variables
/// without deadlocking on the shared lock.
pub fn with_test_config_env<F, R>(f: F) -> R
where
    F: FnOnce(&Path, &mut TestEnvVarGuard) -> R,
{
    let mut outer = TestEnvVarGuard::new();
    let temp_dir = TempDir::new().expect("temp config dir");
    outer.set_var(CONFIG_DIR_ENV, temp_dir.path());

    let mut inner = TestEnvVarGuard::unlocked();
    let result = f(temp_dir.path(), &mut inner);
    drop(inner);
    result
}
