use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use super::KeyValueStore;
use crate::errors::{CoreError, Result};

const BLOB_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed store keeping one `<key>.json` file per blob.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `key`. Keys are limited to ASCII alphanumerics, `_` and `-` so each
    /// key maps to exactly one file inside the root.
    pub fn blob_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{BLOB_EXTENSION}")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_blob(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.blob_path(key)?) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CoreError::read(key, err)),
        }
    }

    fn set_blob(&self, key: &str, value: &str) -> Result<()> {
        let path = self.blob_path(key)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value).map_err(|err| CoreError::write(key, err))?;
        fs::rename(&tmp, &path).map_err(|err| CoreError::write(key, err))?;
        tracing::trace!(key, path = %path.display(), "blob written");
        Ok(())
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.blob_path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CoreError::write(key, err)),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|err| CoreError::read("*", err))? {
            let path = entry.map_err(|err| CoreError::read("*", err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BLOB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidInput(format!(
            "`{key}` is not a valid blob key (ASCII letters, digits, `_` and `-` only)"
        )))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    tmp.set_extension(format!("{}.{}", BLOB_EXTENSION, TMP_SUFFIX));
    tmp
}

fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_outside_the_safe_alphabet_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        assert_eq!(
            store.blob_path("budget_2024_3").unwrap(),
            dir.path().join("budget_2024_3.json")
        );

        for key in ["a b", "a-b ", "../etc/passwd", "", "caf\u{e9}"] {
            assert!(matches!(store.blob_path(key), Err(CoreError::InvalidInput(_))), "{key:?}");
            assert!(store.set_blob(key, "[]").is_err());
        }
        store.set_blob("a-b", "[]").unwrap();
        assert!(store.get_blob("a b").is_err());
        assert_eq!(store.keys().unwrap(), vec!["a-b".to_string()]);
    }

    #[test]
    fn tmp_path_keeps_blob_name() {
        let tmp = tmp_path(Path::new("/data/transactions.json"));
        assert_eq!(tmp, PathBuf::from("/data/transactions.json.tmp"));
    }
}
