use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// CsvConnection manages the data directory and hands repositories their
/// file paths. Cloning shares the write lock, so every repository created
/// from the same connection serializes its read-modify-write cycles.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Get the path of a collection file inside the data directory
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }

    /// Ensure a collection file exists with its CSV header
    pub fn ensure_file(&self, file_name: &str, header: &str) -> Result<PathBuf> {
        let path = self.file_path(file_name);
        if !path.exists() {
            fs::write(&path, format!("{}\n", header))?;
        }
        Ok(path)
    }

    /// Take the shared write lock for a read-modify-write cycle
    pub fn lock_for_write(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_file_writes_header_once() {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();

        let path = conn.ensure_file("patients.csv", "id,name").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "id,name\n");

        // Re-ensuring must not truncate existing data
        fs::write(&path, "id,name\np1,Jane\n").unwrap();
        conn.ensure_file("patients.csv", "id,name").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "id,name\np1,Jane\n");
    }

    #[test]
    fn test_creates_missing_base_directory() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("data").join("mhaas");
        let conn = CsvConnection::new(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(conn.base_directory(), nested.as_path());
    }
}
