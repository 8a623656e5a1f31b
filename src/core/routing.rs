use crate::domain::model::RoutingTable;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use std::io::Read;

impl RoutingTable {
    pub fn from_slice(path: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| EtlError::RoutingTableError {
            path: path.to_string(),
            reason: format!("invalid routing document: {}", e),
        })
    }

    pub fn from_reader<R: Read>(path: &str, reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| EtlError::RoutingTableError {
            path: path.to_string(),
            reason: format!("invalid routing document: {}", e),
        })
    }

    /// 啟動時載入一次；讀不到或格式錯誤都是致命錯誤
    pub fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        let bytes = storage
            .read_file(path)
            .map_err(|e| EtlError::RoutingTableError {
                path: path.to_string(),
                reason: match e {
                    EtlError::IoError(io) => io.to_string(),
                    other => other.to_string(),
                },
            })?;

        let table = Self::from_slice(path, &bytes)?;

        if table.is_empty() {
            tracing::warn!(
                path = %path,
                "⚠️ Routing table is empty, every record will use the default pipeline"
            );
        } else {
            tracing::info!(path = %path, entries = table.len(), "Loaded routing table");
        }

        Ok(table)
    }
}
