//! Account Store: the forest and balance map behind a key-value backend
//!
//! Persisted layout: the forest is a JSON array of nested account records
//! under one key, balances a flat `name -> {totalDebit, totalCredit}` object
//! under another. Unusable data never fails a load; it is logged and replaced
//! by empty state.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chartbook_config::{Config, StorageBackend, StorageConfig};

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::forest::Forest;
use crate::models::{AccountRecord, BalanceMap};
use crate::seed;
use crate::view::ViewState;

const DOCUMENT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// String key-value persistence
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> CoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&mut self, key: &str) -> CoreResult<()>;
}

/// In-process store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store; key `k` lives in `<dir>/k.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, DOCUMENT_EXTENSION))
    }
}

fn write_atomic(path: &Path, contents: &str) -> CoreResult<()> {
    let tmp = path.with_extension(format!("{}.{}", DOCUMENT_EXTENSION, TMP_SUFFIX));
    let mut file = fs::File::create(&tmp)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        write_atomic(&self.path_for(key), value)
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Forest plus the expand state persisted alongside it
#[derive(Debug, Clone, Default)]
pub struct ChartSnapshot {
    pub forest: Forest,
    pub view: ViewState,
}

/// Loads and saves the chart and its balances
pub struct AccountStore {
    backend: Box<dyn KeyValueStore>,
    accounts_key: String,
    balances_key: String,
    seed_default_chart: bool,
    logger: DefaultErrorLogger,
}

impl AccountStore {
    pub fn new(backend: Box<dyn KeyValueStore>, storage: &StorageConfig) -> Self {
        Self {
            backend,
            accounts_key: storage.accounts_key.clone(),
            balances_key: storage.balances_key.clone(),
            seed_default_chart: storage.seed_default_chart,
            logger: DefaultErrorLogger,
        }
    }

    /// Build the backend named by the configuration
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let backend: Box<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::File => Box::new(FileStore::new(&config.storage.path)?),
            StorageBackend::Memory => Box::new(MemoryStore::new()),
        };
        Ok(Self::new(backend, &config.storage))
    }

    /// Current forest; empty on corrupt or (with seeding off) absent data
    pub fn load_accounts(&mut self) -> ChartSnapshot {
        let context = ErrorContext::new("load_accounts")
            .with_data("key", serde_json::json!(self.accounts_key));

        let text = match self.read(&self.accounts_key) {
            Ok(Some(text)) => text,
            Ok(None) if self.seed_default_chart => return self.seed_accounts(&context),
            Ok(None) => return ChartSnapshot::default(),
            Err(error) => {
                self.logger.log_error(&error, &context);
                return ChartSnapshot::default();
            }
        };

        let parsed = serde_json::from_str::<Vec<AccountRecord>>(&text)
            .map_err(|e| CoreError::StoreCorrupt {
                key: self.accounts_key.clone(),
                message: e.to_string(),
            })
            .and_then(|records| Forest::from_records(&records));

        match parsed {
            Ok((forest, view)) => {
                log::debug!("Loaded {} accounts from '{}'", forest.len(), self.accounts_key);
                ChartSnapshot { forest, view }
            }
            Err(error) => {
                self.logger.log_error(&error, &context);
                ChartSnapshot::default()
            }
        }
    }

    /// Name -> totals map; empty on corrupt or (with seeding off) absent data
    pub fn load_balances(&mut self) -> BalanceMap {
        let context = ErrorContext::new("load_balances")
            .with_data("key", serde_json::json!(self.balances_key));

        let text = match self.read(&self.balances_key) {
            Ok(Some(text)) => text,
            Ok(None) if self.seed_default_chart => {
                let balances = seed::default_balances();
                log::info!("Seeding '{}' with {} balances", self.balances_key, balances.len());
                if let Err(e) = self.save_balances(&balances) {
                    self.logger.log_error(&e, &context);
                }
                return balances;
            }
            Ok(None) => return BalanceMap::new(),
            Err(error) => {
                self.logger.log_error(&error, &context);
                return BalanceMap::new();
            }
        };

        match serde_json::from_str::<BalanceMap>(&text) {
            Ok(mut balances) => {
                for (name, balance) in balances.iter_mut() {
                    if balance.account.is_empty() {
                        balance.account = name.clone();
                    }
                }
                balances
            }
            Err(e) => {
                let error = CoreError::StoreCorrupt {
                    key: self.balances_key.clone(),
                    message: e.to_string(),
                };
                self.logger.log_error(&error, &context);
                BalanceMap::new()
            }
        }
    }

    pub fn save_accounts(&mut self, forest: &Forest, view: &ViewState) -> CoreResult<()> {
        let text = serde_json::to_string_pretty(&forest.to_records(view)).map_err(|e| {
            CoreError::InternalError {
                message: e.to_string(),
            }
        })?;
        self.backend.set(&self.accounts_key, &text)?;
        log::debug!("Saved {} accounts to '{}'", forest.len(), self.accounts_key);
        Ok(())
    }

    pub fn save_balances(&mut self, balances: &BalanceMap) -> CoreResult<()> {
        let text = serde_json::to_string_pretty(balances).map_err(|e| CoreError::InternalError {
            message: e.to_string(),
        })?;
        self.backend.set(&self.balances_key, &text)?;
        log::debug!("Saved {} balances to '{}'", balances.len(), self.balances_key);
        Ok(())
    }

    /// A backend that cannot be read is reported as corrupt, never as absent,
    /// so seeding cannot overwrite a document that is merely unreadable
    fn read(&self, key: &str) -> CoreResult<Option<String>> {
        self.backend.get(key).map_err(|e| CoreError::StoreCorrupt {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn seed_accounts(&mut self, context: &ErrorContext) -> ChartSnapshot {
        match Forest::from_records(&seed::default_chart()) {
            Ok((forest, view)) => {
                log::info!(
                    "Seeding '{}' with the standard chart ({} accounts)",
                    self.accounts_key,
                    forest.len()
                );
                if let Err(e) = self.save_accounts(&forest, &view) {
                    self.logger.log_error(&e, context);
                }
                ChartSnapshot { forest, view }
            }
            Err(e) => {
                self.logger.log_error(&e, context);
                ChartSnapshot::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use crate::types::RootType;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Mutex};

    fn storage(seed: bool) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Memory,
            seed_default_chart: seed,
            ..StorageConfig::default()
        }
    }

    fn store_with(entries: &[(&str, &str)], seed: bool) -> AccountStore {
        let mut backend = MemoryStore::new();
        for (k, v) in entries {
            backend.set(k, v).unwrap();
        }
        AccountStore::new(Box::new(backend), &storage(seed))
    }

    /// Backend whose reads fail; records every key written to it
    struct UnreadableStore {
        writes: Arc<Mutex<Vec<String>>>,
    }

    impl KeyValueStore for UnreadableStore {
        fn get(&self, _key: &str) -> CoreResult<Option<String>> {
            Err(CoreError::IoError {
                message: "permission denied".to_string(),
            })
        }

        fn set(&mut self, key: &str, _value: &str) -> CoreResult<()> {
            self.writes.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn remove(&mut self, _key: &str) -> CoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_read_error_falls_back_to_empty_without_seeding() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let backend = UnreadableStore {
            writes: Arc::clone(&writes),
        };
        let mut store = AccountStore::new(Box::new(backend), &storage(true));

        let snapshot = store.load_accounts();
        assert!(snapshot.forest.is_empty());
        assert!(store.load_balances().is_empty());
        assert!(writes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_absent_store_without_seed_is_empty() {
        let mut store = store_with(&[], false);
        assert!(store.load_accounts().forest.is_empty());
        assert!(store.load_balances().is_empty());
    }

    #[test]
    fn test_first_access_seeds_and_persists() {
        let mut store = store_with(&[], true);
        let snapshot = store.load_accounts();
        assert_eq!(snapshot.forest.len(), 24);
        assert_eq!(store.load_balances().len(), 15);

        // Second read comes back from the backend, not the seed
        let again = store.load_accounts();
        assert_eq!(again.forest, snapshot.forest);
        assert_eq!(again.view, snapshot.view);
        assert!(store.backend.get("chartOfAccounts").unwrap().is_some());
        assert!(store.backend.get("accountBalances").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_accounts_fall_back_to_empty() {
        let mut store = store_with(&[("chartOfAccounts", "{not json")], true);
        assert!(store.load_accounts().forest.is_empty());
    }

    #[test]
    fn test_structurally_invalid_accounts_fall_back_to_empty() {
        let json = r#"[
            {"name": "Assets", "rootType": "Asset", "accountType": "Group", "isGroup": true},
            {"name": "Assets", "rootType": "Asset", "accountType": "Group", "isGroup": true}
        ]"#;
        let mut store = store_with(&[("chartOfAccounts", json)], true);
        assert!(store.load_accounts().forest.is_empty());
    }

    #[test]
    fn test_corrupt_balances_fall_back_to_empty() {
        let mut store = store_with(&[("accountBalances", "[1, 2, 3]")], true);
        assert!(store.load_balances().is_empty());
    }

    #[test]
    fn test_balances_take_name_from_key() {
        let json = r#"{ "Cash": { "totalDebit": 10, "totalCredit": 4 } }"#;
        let mut store = store_with(&[("accountBalances", json)], false);
        let balances = store.load_balances();
        let cash = &balances["Cash"];
        assert_eq!(cash.account, "Cash");
        assert_eq!(cash.total_debit, Decimal::from(10));
        assert_eq!(cash.total_credit, Decimal::from(4));
    }

    #[test]
    fn test_save_then_load_accounts() {
        let mut store = store_with(&[], false);
        let mut forest = Forest::new();
        forest.insert(None, Account::group("Equity", RootType::Equity)).unwrap();
        forest
            .insert(Some("Equity"), Account::detail("Share Capital", RootType::Equity))
            .unwrap();
        let mut view = ViewState::new();
        view.set_expanded(forest.find("Equity").unwrap(), true);

        store.save_accounts(&forest, &view).unwrap();
        let loaded = store.load_accounts();
        assert_eq!(loaded.forest, forest);
        assert!(loaded.view.is_expanded(loaded.forest.find("Equity").unwrap()));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = FileStore::new(dir.path().join("data")).unwrap();
        assert!(files.get("chart").unwrap().is_none());

        files.set("chart", "[]").unwrap();
        assert_eq!(files.get("chart").unwrap().as_deref(), Some("[]"));
        assert!(files.path_for("chart").exists());

        files.remove("chart").unwrap();
        assert!(files.get("chart").unwrap().is_none());
        files.remove("chart").unwrap();
    }

    #[test]
    fn test_account_store_on_files_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            path: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };

        let mut store =
            AccountStore::new(Box::new(FileStore::new(&config.path).unwrap()), &config);
        let snapshot = store.load_accounts();
        let mut forest = snapshot.forest;
        forest.delete("Inventory").unwrap();
        store.save_accounts(&forest, &snapshot.view).unwrap();

        let mut reopened =
            AccountStore::new(Box::new(FileStore::new(&config.path).unwrap()), &config);
        let loaded = reopened.load_accounts();
        assert_eq!(loaded.forest.len(), 23);
        assert!(!loaded.forest.contains("Inventory"));
    }
}
