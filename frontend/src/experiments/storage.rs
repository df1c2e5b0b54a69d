#[cfg(test)]
use std::cell::{Cell, RefCell};
#[cfg(test)]
use std::collections::HashMap;

use web_sys::window;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("client storage unavailable: {reason}")]
pub struct PersistenceUnavailable {
    reason: String,
}

impl PersistenceUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

pub trait ClientStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceUnavailable>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceUnavailable>;
    #[cfg(test)]
    fn remove(&self, key: &str) -> Result<(), PersistenceUnavailable>;
}

#[derive(Clone)]
pub struct BrowserStorage {
    inner: Option<web_sys::Storage>,
}

impl BrowserStorage {
    pub fn local() -> Self {
        let inner = window().and_then(|w| w.local_storage().ok().flatten());
        if inner.is_none() {
            log::warn!("localStorage is not available, experiment assignments will not persist");
        }
        Self { inner }
    }

    fn storage(&self) -> Result<&web_sys::Storage, PersistenceUnavailable> {
        self.inner
            .as_ref()
            .ok_or_else(|| PersistenceUnavailable::new("localStorage missing"))
    }
}

impl ClientStorage for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceUnavailable> {
        self.storage()?
            .get_item(key)
            .map_err(|e| PersistenceUnavailable::new(format!("read {key}: {e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceUnavailable> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| PersistenceUnavailable::new(format!("write {key}: {e:?}")))
    }

    #[cfg(test)]
    fn remove(&self, key: &str) -> Result<(), PersistenceUnavailable> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| PersistenceUnavailable::new(format!("remove {key}: {e:?}")))
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    unavailable: Cell<bool>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.set(!available);
    }

    fn check(&self) -> Result<(), PersistenceUnavailable> {
        if self.unavailable.get() {
            Err(PersistenceUnavailable::new("memory storage switched off"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceUnavailable> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceUnavailable> {
        self.check()?;
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceUnavailable> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn local_storage_round_trips() {
        let storage = BrowserStorage::local();
        storage.set("storage_test_key", "value").unwrap();
        assert_eq!(storage.get("storage_test_key").unwrap().as_deref(), Some("value"));
        storage.remove("storage_test_key").unwrap();
        assert_eq!(storage.get("storage_test_key").unwrap(), None);
    }
}
