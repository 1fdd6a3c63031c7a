//! Credential handling: resolving, storing, and removing the API key.
//!
//! The key is never written into config or history files. Resolution order is
//! the `GEMINI_API_KEY` environment variable first, then the OS keyring entry
//! managed by `geminal auth` / `geminal deauth`.

use keyring::Entry;
use std::error::Error;
use std::io::{self, Write};

const KEYRING_SERVICE: &str = "geminal";
const KEYRING_USER: &str = "gemini";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub struct AuthManager {
    use_keyring: bool,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// Construct an AuthManager, optionally disabling keyring access. Used
    /// by tests and by the `--env-only` flag.
    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self { use_keyring }
    }

    /// Looks up the API key: environment first, keyring second. `Ok(None)`
    /// means no credential is configured anywhere.
    pub fn resolve_api_key(&self) -> Result<Option<String>, Box<dyn Error>> {
        if let Some(key) = env_api_key() {
            return Ok(Some(key));
        }
        if !self.use_keyring {
            return Ok(None);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(Box::new(err)),
        }
    }

    pub fn store_api_key(&self, key: &str) -> Result<(), Box<dyn Error>> {
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        entry.set_password(key)?;
        Ok(())
    }

    /// Removes the stored key. Returns false when there was nothing to
    /// remove.
    pub fn remove_api_key(&self) -> Result<bool, Box<dyn Error>> {
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(Box::new(err)),
        }
    }

    /// `geminal auth`: prompt for a key on stdin and store it in the keyring.
    pub fn interactive_auth(&self) -> Result<(), Box<dyn Error>> {
        println!("Geminal stores your API key in the system keyring.");
        println!("Create a key at https://aistudio.google.com/apikey if you don't have one.");
        println!();
        print!("Enter your Gemini API key: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let key = input.trim();

        if key.is_empty() {
            return Err("No API key entered".into());
        }

        self.store_api_key(key)?;
        println!("✅ API key stored in the system keyring");
        Ok(())
    }

    /// `geminal deauth`: remove the stored key.
    pub fn interactive_deauth(&self) -> Result<(), Box<dyn Error>> {
        if self.remove_api_key()? {
            println!("✅ API key removed from the system keyring");
        } else {
            println!("No stored API key to remove");
            if env_api_key().is_some() {
                println!("({API_KEY_ENV} is set in this environment and is unaffected)");
            }
        }
        Ok(())
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

fn env_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_wins_and_empty_env_counts_as_absent() {
        let manager = AuthManager::new_with_keyring(false);
        let previous = std::env::var(API_KEY_ENV).ok();

        std::env::set_var(API_KEY_ENV, "test-key-123");
        assert_eq!(
            manager.resolve_api_key().unwrap().as_deref(),
            Some("test-key-123")
        );

        std::env::set_var(API_KEY_ENV, "");
        assert_eq!(manager.resolve_api_key().unwrap(), None);

        std::env::remove_var(API_KEY_ENV);
        assert_eq!(manager.resolve_api_key().unwrap(), None);

        if let Some(value) = previous {
            std::env::set_var(API_KEY_ENV, value);
        }
    }
}
