use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::chain::Chain;
use crate::codec;
use crate::codec::dto::ChainDocument;
use crate::error::StoreError;

/// Key holding the current working chain.
pub const CURRENT_CHAIN_KEY: &str = "apiChain";
/// Key holding the `{name -> document}` map of saved chains.
pub const SAVED_CHAINS_KEY: &str = "savedChains";

/// String key-value capability the caller owns. The engine never touches it;
/// chains pass through the codec on the way in and out so stored bytes are
/// always portable documents.
pub trait ChainStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Single-file store: one JSON object of `{key: value}` entries.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<HashMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl ChainStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// Named-chain layer over a [`ChainStore`].
pub struct SavedChains<'a> {
    store: &'a dyn ChainStore,
}

impl<'a> SavedChains<'a> {
    pub fn new(store: &'a dyn ChainStore) -> Self {
        Self { store }
    }

    pub fn save(&self, name: &str, chain: &Chain) -> Result<(), StoreError> {
        let mut all = self.read_all()?;
        all.insert(name.to_string(), codec::document(chain));
        self.store
            .set(SAVED_CHAINS_KEY, &serde_json::to_string(&all)?)
    }

    pub fn load(&self, name: &str) -> Result<Chain, StoreError> {
        let mut all = self.read_all()?;
        let doc = all
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        Ok(codec::decode_document(doc)?)
    }

    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_all()?.into_keys().collect())
    }

    pub fn current(&self) -> Result<Option<Chain>, StoreError> {
        match self.store.get(CURRENT_CHAIN_KEY)? {
            Some(text) => Ok(Some(codec::decode(&text)?)),
            None => Ok(None),
        }
    }

    /// Replaces the current working chain wholesale.
    pub fn set_current(&self, chain: &Chain) -> Result<(), StoreError> {
        self.store.set(CURRENT_CHAIN_KEY, &codec::encode(chain))
    }

    fn read_all(&self) -> Result<BTreeMap<String, ChainDocument>, StoreError> {
        match self.store.get(SAVED_CHAINS_KEY)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(BTreeMap::new()),
        }
    }
}
