//! Saved Tender Registry
//!
//! The set of tenders the user has bookmarked. Loaded once on start-up and
//! written back in full after every change. The set is global to this
//! client, not scoped per user.
//!
//! If storage fails, the registry keeps working in memory for the rest of
//! the session and reports a [`StorageWarning`] instead of an error.

use scout_core::{StorageError, TenderId};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::store::DurableStore;

/// Non-blocking problem with durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageWarning {
    /// Saved tenders could not be read; starting empty, in memory only.
    ReadFailed(String),
    /// A change could not be written; further changes stay in memory only.
    WriteFailed(String),
    /// The stored value was unreadable and has been ignored.
    Corrupt(String),
}

impl fmt::Display for StorageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageWarning::ReadFailed(e) => {
                write!(f, "Saved tenders could not be loaded ({e}); changes will not persist")
            }
            StorageWarning::WriteFailed(e) => {
                write!(f, "Saved tenders could not be stored ({e}); changes will not persist")
            }
            StorageWarning::Corrupt(e) => {
                write!(f, "Stored saved tenders were unreadable and have been reset ({e})")
            }
        }
    }
}

/// Durable bookmark set of tender ids.
pub struct SavedTenderRegistry {
    ids: BTreeSet<TenderId>,
    store: Arc<dyn DurableStore>,
    key: String,
    /// Set once storage has failed; from then on nothing is written.
    degraded: bool,
    warning: Option<StorageWarning>,
}

impl SavedTenderRegistry {
    /// Load the registry from `store` under `key`.
    ///
    /// Never fails: storage problems become a warning.
    pub fn load(store: Arc<dyn DurableStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let mut registry = Self {
            ids: BTreeSet::new(),
            store,
            key,
            degraded: false,
            warning: None,
        };

        match registry.store.read(&registry.key) {
            Ok(None) => {
                tracing::debug!("No saved tenders under '{}'", registry.key);
            }
            Ok(Some(text)) => match serde_json::from_str::<BTreeSet<TenderId>>(&text) {
                Ok(ids) => {
                    tracing::debug!("Loaded {} saved tenders", ids.len());
                    registry.ids = ids;
                }
                Err(e) => {
                    let err = StorageError::Corrupt {
                        key: registry.key.clone(),
                        message: e.to_string(),
                    };
                    tracing::warn!("{}", err);
                    registry.warning = Some(StorageWarning::Corrupt(e.to_string()));
                }
            },
            Err(e) => {
                tracing::warn!("Saved tenders unavailable, continuing in memory: {}", e);
                registry.degraded = true;
                registry.warning = Some(StorageWarning::ReadFailed(e.to_string()));
            }
        }

        registry
    }

    /// Flip membership of `id` and persist. Returns whether `id` is saved afterwards.
    pub fn toggle(&mut self, id: &TenderId) -> bool {
        let saved = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        };
        tracing::debug!("Tender {} saved: {}", id, saved);
        self.persist();
        saved
    }

    pub fn is_saved(&self, id: &TenderId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Saved ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &TenderId> {
        self.ids.iter()
    }

    /// True once the registry has fallen back to memory only.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Latest storage warning, if any.
    pub fn warning(&self) -> Option<&StorageWarning> {
        self.warning.as_ref()
    }

    /// Acknowledge the current warning.
    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    fn persist(&mut self) {
        if self.degraded {
            return;
        }

        let result = serde_json::to_string(&self.ids)
            .map_err(|e| StorageError::Unavailable(e.to_string()))
            .and_then(|json| self.store.write(&self.key, &json));

        if let Err(e) = result {
            tracing::warn!("Failed to persist saved tenders, continuing in memory: {}", e);
            self.degraded = true;
            self.warning = Some(StorageWarning::WriteFailed(e.to_string()));
        }
    }
}

impl fmt::Debug for SavedTenderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavedTenderRegistry")
            .field("ids", &self.ids)
            .field("key", &self.key)
            .field("degraded", &self.degraded)
            .field("warning", &self.warning)
            .finish()
    }
}
