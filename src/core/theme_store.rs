//! Persisted dark/light preference and its projection onto the document root.
//!
//! The preference lives under a single storage key. Dark is the default and is
//! stored as the key's absence; light is stored as `"light"`. The document
//! root carries a matching `data-theme` attribute that the renderer reads to
//! pick a palette.

use crate::core::config::io::project_dirs;
use crate::core::error::PersistenceError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub const THEME_KEY: &str = "theme";
pub const THEME_ATTRIBUTE: &str = "data-theme";
const LIGHT_VALUE: &str = "light";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preference {
    #[default]
    Dark,
    Light,
}

impl Preference {
    pub fn opposite(self) -> Self {
        match self {
            Preference::Dark => Preference::Light,
            Preference::Light => Preference::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preference::Dark => "dark",
            Preference::Light => "light",
        }
    }

    /// Interpret a stored value. Anything other than `"light"` reads as dark.
    fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(LIGHT_VALUE) => Preference::Light,
            _ => Preference::Dark,
        }
    }
}

/// Attributes on the root of the rendered document.
///
/// Only presentation code reads these; logic always goes through
/// [`ThemeStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRoot {
    attributes: BTreeMap<String, String>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    /// The preference currently reflected on this document.
    pub fn applied_preference(&self) -> Preference {
        Preference::from_stored(self.attribute(THEME_ATTRIBUTE))
    }
}

/// Key/value store backing persisted preferences.
pub trait PreferenceStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

impl<T: PreferenceStorage + ?Sized> PreferenceStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }
}

/// Preferences kept in a small TOML table on disk.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the platform data directory, or `None` when the platform
    /// exposes no home directory.
    pub fn default_location() -> Option<Self> {
        project_dirs().map(|dirs| Self::new(dirs.data_dir().join("preferences.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| PersistenceError::Read {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| PersistenceError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// The table to rewrite on `set`/`remove`. A corrupt file is replaced;
    /// a file that cannot be read is left alone.
    fn read_table_for_update(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        match self.read_table() {
            Err(err @ PersistenceError::Parse { .. }) => {
                warn!(error = %err, "replacing unreadable preferences file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_table(&self, table: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|err| self.write_error(err))?;
        }

        let contents = toml::to_string(table).map_err(|err| self.write_error(err))?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|err| self.write_error(err))?;
        temp_file
            .write_all(contents.as_bytes())
            .map_err(|err| self.write_error(err))?;
        temp_file
            .persist(&self.path)
            .map_err(|err| self.write_error(err.error))?;
        Ok(())
    }

    fn write_error<E>(&self, source: E) -> PersistenceError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PersistenceError::Write {
            path: self.path.clone(),
            source: Box::new(source),
        }
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.read_table()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut table = self.read_table_for_update()?;
        table.insert(key.to_string(), value.to_string());
        self.write_table(&table)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut table = self.read_table_for_update()?;
        if table.remove(key).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_table(&table)
    }
}

/// In-memory storage. A disabled store fails every call, like a browser with
/// storage switched off.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<BTreeMap<String, String>>,
    disabled: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            values: RefCell::default(),
            disabled: true,
        }
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.disabled {
            Err(PersistenceError::Unavailable("storage is disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.check()?;
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

pub struct ThemeStore<S> {
    storage: S,
}

impl<S: PreferenceStorage> ThemeStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the persisted preference, failing open to dark.
    pub fn load(&self) -> Preference {
        match self.storage.get(THEME_KEY) {
            Ok(value) => {
                let preference = Preference::from_stored(value.as_deref());
                debug!(preference = preference.as_str(), "loaded theme preference");
                preference
            }
            Err(err) => {
                warn!(error = %err, "theme preference unreadable; using dark");
                Preference::Dark
            }
        }
    }

    /// Persist the preference. Failures are logged and otherwise ignored.
    pub fn save(&self, preference: Preference) {
        let result = match preference {
            Preference::Light => self.storage.set(THEME_KEY, LIGHT_VALUE),
            Preference::Dark => self.storage.remove(THEME_KEY),
        };
        if let Err(err) = result {
            warn!(
                error = %err,
                preference = preference.as_str(),
                "failed to persist theme preference"
            );
        }
    }

    pub fn apply(&self, document: &mut DocumentRoot, preference: Preference) {
        match preference {
            Preference::Light => document.set_attribute(THEME_ATTRIBUTE, LIGHT_VALUE),
            Preference::Dark => document.remove_attribute(THEME_ATTRIBUTE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_defaults_to_dark_when_nothing_is_stored() {
        let store = ThemeStore::new(MemoryStorage::new());
        assert_eq!(store.load(), Preference::Dark);
    }

    #[test]
    fn load_fails_open_when_storage_is_disabled() {
        let store = ThemeStore::new(MemoryStorage::disabled());
        assert_eq!(store.load(), Preference::Dark);
        // Saving is swallowed rather than surfaced.
        store.save(Preference::Light);
        assert_eq!(store.load(), Preference::Dark);
    }

    #[test]
    fn unrecognised_stored_values_read_as_dark() {
        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "solarized").expect("set");
        let store = ThemeStore::new(storage);
        assert_eq!(store.load(), Preference::Dark);
    }

    #[test]
    fn dark_is_stored_as_absence() {
        let store = ThemeStore::new(MemoryStorage::new());
        store.save(Preference::Light);
        assert_eq!(
            store.storage().get(THEME_KEY).expect("get").as_deref(),
            Some("light")
        );
        store.save(Preference::Dark);
        assert_eq!(store.storage().get(THEME_KEY).expect("get"), None);
    }

    #[test]
    fn apply_is_idempotent() {
        let store = ThemeStore::new(MemoryStorage::new());
        let mut document = DocumentRoot::new();

        store.apply(&mut document, Preference::Light);
        let once = document.clone();
        store.apply(&mut document, Preference::Light);
        assert_eq!(document, once);
        assert_eq!(document.attribute(THEME_ATTRIBUTE), Some("light"));

        store.apply(&mut document, Preference::Dark);
        store.apply(&mut document, Preference::Dark);
        assert_eq!(document.attribute(THEME_ATTRIBUTE), None);
        assert_eq!(document.applied_preference(), Preference::Dark);
    }

    #[test]
    fn file_storage_round_trips_across_instances() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("state").join("preferences.toml");

        ThemeStore::new(FileStorage::new(&path)).save(Preference::Light);
        assert!(path.exists());
        assert_eq!(
            ThemeStore::new(FileStorage::new(&path)).load(),
            Preference::Light
        );

        ThemeStore::new(FileStorage::new(&path)).save(Preference::Dark);
        assert_eq!(
            ThemeStore::new(FileStorage::new(&path)).load(),
            Preference::Dark
        );
        let contents = fs::read_to_string(&path).expect("read preferences");
        assert!(!contents.contains("theme"));
    }

    #[test]
    fn file_storage_keeps_unrelated_keys() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("preferences.toml");
        fs::write(&path, "other = \"kept\"\n").expect("seed");

        let storage = FileStorage::new(&path);
        storage.set(THEME_KEY, "light").expect("set");
        assert_eq!(storage.get("other").expect("get").as_deref(), Some("kept"));
    }

    #[test]
    fn corrupt_preference_file_fails_open() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("preferences.toml");
        fs::write(&path, "theme = [broken").expect("seed");

        let store = ThemeStore::new(FileStorage::new(&path));
        assert!(matches!(
            store.storage().get(THEME_KEY),
            Err(PersistenceError::Parse { .. })
        ));
        assert_eq!(store.load(), Preference::Dark);

        // A save replaces the unreadable file instead of failing forever.
        store.save(Preference::Light);
        assert_eq!(store.load(), Preference::Light);
    }

    #[test]
    fn unreadable_preference_file_is_not_overwritten() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("preferences.toml");
        // A directory in place of the file makes every read fail.
        fs::create_dir_all(&path).expect("create dir");

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.set(THEME_KEY, "light"),
            Err(PersistenceError::Read { .. })
        ));
        assert!(matches!(
            storage.remove(THEME_KEY),
            Err(PersistenceError::Read { .. })
        ));

        let store = ThemeStore::new(storage);
        store.save(Preference::Light);
        assert!(path.is_dir());
        assert_eq!(store.load(), Preference::Dark);
    }

    #[test]
    fn removing_from_missing_file_does_not_create_it() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("preferences.toml");
        FileStorage::new(&path).remove(THEME_KEY).expect("remove");
        assert!(!path.exists());
    }
}
