use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// 絕對路徑會直接覆蓋 base_path
    pub fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".".to_string())
    }
}

impl Storage for LocalStorage {
    type Reader = File;
    type Writer = BufWriter<File>;

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    fn open_read(&self, path: &str) -> Result<Self::Reader> {
        File::open(self.resolve(path)).map_err(|source| EtlError::InputOpenError {
            path: path.to_string(),
            source,
        })
    }

    fn create(&self, path: &str) -> Result<Self::Writer> {
        let full_path = self.resolve(path);
        let to_error = |source| EtlError::OutputCreateError {
            path: path.to_string(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(to_error)?;
        }

        let file = File::create(&full_path).map_err(to_error)?;
        Ok(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::TempDir;

    #[test]
    fn test_create_makes_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let mut writer = storage.create("nested/dir/out.ndjson.gz").unwrap();
        writer.write_all(b"data").unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut content = String::new();
        storage
            .open_read("nested/dir/out.ndjson.gz")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "data");
        assert_eq!(storage.read_file("nested/dir/out.ndjson.gz").unwrap(), b"data");
    }

    #[test]
    fn test_open_missing_file_is_input_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        match storage.open_read("missing.ndjson.gz") {
            Err(EtlError::InputOpenError { path, .. }) => assert_eq!(path, "missing.ndjson.gz"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
