//! Replaceable API credential shared between the provider and the API layer

use std::sync::RwLock;

/// API key slot that can be re-selected while the server is running.
#[derive(Debug, Default)]
pub struct ApiCredential {
    key: RwLock<Option<String>>,
}

impl ApiCredential {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: RwLock::new(key.filter(|k| !k.trim().is_empty())),
        }
    }

    /// Current key, if one is configured
    pub fn get(&self) -> Option<String> {
        match self.key.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    /// Replace the key. Blank keys are ignored and reported as `false`.
    pub fn replace(&self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        let mut guard = match self.key.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(key.to_string());
        true
    }
}
