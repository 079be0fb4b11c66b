//! API token persistence in the system keychain.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use crate::error::CliError;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "blinko-cli";

/// Keychain slot holding one profile's API token.
#[derive(Clone)]
pub struct TokenStore {
    username: String,
}

impl TokenStore {
    pub fn for_profile(profile_name: &str) -> Self {
        Self {
            username: format!("api_token:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry, CliError> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| CliError::Credentials(error.to_string()))
    }

    #[cfg(not(test))]
    pub fn load(&self) -> Result<Option<String>, CliError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(CliError::Credentials(error.to_string())),
        }
    }

    #[cfg(test)]
    pub fn load(&self) -> Result<Option<String>, CliError> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| CliError::Credentials(error.to_string()))?;
        Ok(guard.get(&self.username).cloned())
    }

    #[cfg(not(test))]
    pub fn save(&self, token: &str) -> Result<(), CliError> {
        self.entry()?
            .set_password(token)
            .map_err(|error| CliError::Credentials(error.to_string()))
    }

    #[cfg(test)]
    pub fn save(&self, token: &str) -> Result<(), CliError> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| CliError::Credentials(error.to_string()))?;
        guard.insert(self.username.clone(), token.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_scoped_per_profile() {
        let work = TokenStore::for_profile("creds-test-work");
        let home = TokenStore::for_profile("creds-test-home");
        work.save("work-token").unwrap();

        assert_eq!(work.load().unwrap().as_deref(), Some("work-token"));
        assert_eq!(home.load().unwrap(), None);
    }
}
