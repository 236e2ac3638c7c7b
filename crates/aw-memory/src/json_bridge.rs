//! Versioned JSON snapshot of the full store contents.
//!
//! Export writes every record and connection verbatim; import restores
//! them verbatim, including ids, counters, and timestamps, and rebuilds
//! the token index. Import never forms links on its own — the snapshot's
//! connection list is the complete graph.

use std::fs;
use std::path::Path;

use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::record::{Connection, MemoryRecord};
use crate::store::MemoryStore;
use crate::text;

pub const CURRENT_VERSION: u32 = 1;

/// On-disk snapshot format.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportFile {
    pub version: u32,
    pub memories: Vec<MemoryRecord>,
    pub connections: Vec<Connection>,
}

impl MemoryStore {
    pub fn export_json(&self) -> Result<String> {
        let file = ExportFile {
            version: CURRENT_VERSION,
            memories: self.all_memories()?,
            connections: self.all_connections()?,
        };
        serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::InvalidData(format!("export serialization failed: {e}")))
    }

    pub fn export_json_file(&self, path: &Path) -> Result<()> {
        let json = self.export_json()?;
        fs::write(path, json)
            .map_err(|e| StoreError::InvalidData(format!("failed to write {}: {e}", path.display())))
    }

    /// Import a snapshot, overwriting colliding ids. Runs as a single
    /// transaction. Returns (records, connections) imported.
    pub fn import_json(&self, json: &str) -> Result<(usize, usize)> {
        let file: ExportFile = serde_json::from_str(json)
            .map_err(|e| StoreError::InvalidData(format!("invalid snapshot: {e}")))?;
        if file.version != CURRENT_VERSION {
            return Err(StoreError::InvalidData(format!(
                "unsupported snapshot version {}",
                file.version
            )));
        }

        let tx = self.conn().unchecked_transaction()?;
        {
            let mut insert_record = tx.prepare(
                "INSERT OR REPLACE INTO memories
                 (id, content, emotion, timestamp, resonance, access_count, last_accessed, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            let mut clear_tokens = tx.prepare("DELETE FROM tokens WHERE memory_id = ?1")?;
            let mut insert_token =
                tx.prepare("INSERT INTO tokens (token, memory_id) VALUES (?1, ?2)")?;

            for record in &file.memories {
                let id_str = record.id.to_string();
                let metadata = serde_json::to_string(&record.metadata).map_err(|e| {
                    StoreError::InvalidData(format!("unserializable metadata: {e}"))
                })?;
                insert_record.execute(params![
                    id_str,
                    record.content,
                    record.emotion,
                    record.timestamp,
                    record.resonance,
                    record.access_count,
                    record.last_accessed,
                    metadata,
                ])?;

                clear_tokens.execute([&id_str])?;
                for token in text::token_set(&record.content) {
                    insert_token.execute(params![token, id_str])?;
                }
            }

            let mut insert_edge = tx.prepare(
                "INSERT INTO connections (memory_id, connected_id, strength, kind)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for edge in &file.connections {
                insert_edge.execute(params![
                    edge.from.to_string(),
                    edge.to.to_string(),
                    edge.strength,
                    edge.kind.as_str(),
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(
            records = file.memories.len(),
            connections = file.connections.len(),
            "snapshot imported"
        );
        Ok((file.memories.len(), file.connections.len()))
    }

    pub fn import_json_file(&self, path: &Path) -> Result<(usize, usize)> {
        let json = fs::read_to_string(path)
            .map_err(|e| StoreError::InvalidData(format!("failed to read {}: {e}", path.display())))?;
        self.import_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_roundtrip_preserves_records_verbatim() {
        let source = MemoryStore::open_in_memory().unwrap();
        let mut metadata = HashMap::new();
        metadata.insert("origin".to_string(), serde_json::json!("export-test"));
        let id = source
            .store_with("the patterns are beautiful", "wonder", metadata)
            .unwrap();
        source.store("the patterns are strange", "unease").unwrap();
        source.recall("patterns", None, 5).unwrap();

        let json = source.export_json().unwrap();

        let target = MemoryStore::open_in_memory().unwrap();
        let (records, connections) = target.import_json(&json).unwrap();
        assert_eq!(records, 2);
        assert_eq!(connections, 2);

        let original = source.get(id).unwrap().unwrap();
        let restored = target.get(id).unwrap().unwrap();
        assert_eq!(restored.content, original.content);
        assert_eq!(restored.emotion, original.emotion);
        assert_eq!(restored.access_count, original.access_count);
        assert_eq!(restored.timestamp, original.timestamp);
        assert_eq!(restored.metadata, original.metadata);
    }

    #[test]
    fn test_import_rebuilds_token_index() {
        let source = MemoryStore::open_in_memory().unwrap();
        source.store("searchable snapshot content", "neutral").unwrap();
        let json = source.export_json().unwrap();

        let target = MemoryStore::open_in_memory().unwrap();
        target.import_json(&json).unwrap();

        let results = target.recall("searchable snapshot", None, 5).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_import_does_not_form_links() {
        let source = MemoryStore::open_in_memory().unwrap();
        source.store("standalone entry", "neutral").unwrap();

        let mut json: ExportFile = serde_json::from_str(&source.export_json().unwrap()).unwrap();
        json.connections.clear();

        let target = MemoryStore::open_in_memory().unwrap();
        target
            .import_json(&serde_json::to_string(&json).unwrap())
            .unwrap();
        assert_eq!(target.get_statistics().unwrap().total_connections, 0);
    }

    #[test]
    fn test_import_rejects_unknown_version() {
        let store = MemoryStore::open_in_memory().unwrap();
        let result =
            store.import_json(r#"{"version": 99, "memories": [], "connections": []}"#);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let store = MemoryStore::open_in_memory().unwrap();
        assert!(store.import_json("not json at all").is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let source = MemoryStore::open_in_memory().unwrap();
        source.store("durable snapshot", "calm").unwrap();
        source.export_json_file(&path).unwrap();

        let target = MemoryStore::open_in_memory().unwrap();
        let (records, _) = target.import_json_file(&path).unwrap();
        assert_eq!(records, 1);
    }
}
