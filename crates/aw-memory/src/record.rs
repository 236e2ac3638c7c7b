use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single stored memory.
///
/// `content`, `emotion`, `timestamp`, and `metadata` are immutable once
/// stored; `resonance`, `access_count`, and `last_accessed` are adjusted
/// by recall and evolution. Records are never deleted by the core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub content: String,
    /// Free-form tag — deliberately not an enum, so drivers can extend
    /// the emotion vocabulary without schema changes.
    pub emotion: String,
    /// Creation time, Unix seconds.
    pub timestamp: f64,
    /// Current strength: seeded from lexical diversity, then adjusted by
    /// access patterns over time.
    pub resonance: f64,
    pub access_count: u32,
    /// Unix seconds of the most recent recall that returned this record.
    pub last_accessed: f64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// How a connection came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    /// Formed at store time when similarity exceeds the threshold;
    /// always created as a symmetric pair.
    Semantic,
    /// Injected by the dream pass; directed, possibly low-similarity.
    Dream,
}

impl ConnectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionKind::Semantic => "semantic",
            ConnectionKind::Dream => "dream",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "semantic" => Some(ConnectionKind::Semantic),
            "dream" => Some(ConnectionKind::Dream),
            _ => None,
        }
    }
}

/// A directed, weighted, typed edge between two records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Connection {
    pub from: Uuid,
    pub to: Uuid,
    pub strength: f64,
    pub kind: ConnectionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [ConnectionKind::Semantic, ConnectionKind::Dream] {
            assert_eq!(ConnectionKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        assert_eq!(ConnectionKind::parse("psychic"), None);
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), serde_json::json!("test"));

        let record = MemoryRecord {
            id: Uuid::new_v4(),
            content: "hello world".to_string(),
            emotion: "neutral".to_string(),
            timestamp: 1000.0,
            resonance: 0.75,
            access_count: 3,
            last_accessed: 2000.0,
            metadata,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: MemoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.content, record.content);
        assert_eq!(back.access_count, 3);
        assert_eq!(back.metadata["source"], serde_json::json!("test"));
    }

    #[test]
    fn test_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&ConnectionKind::Dream).unwrap();
        assert_eq!(json, "\"dream\"");
    }
}
