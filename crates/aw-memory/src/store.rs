use std::collections::{HashMap, HashSet};
use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use uuid::Uuid;

use crate::config::DreamConfig;
use crate::error::{Result, StoreError};
use crate::record::{Connection as MemoryConnection, ConnectionKind, MemoryRecord};
use crate::schema;
use crate::text;
use crate::time::{DAY_SECS, WEEK_SECS, now_unix_secs};

/// Similarity above this forms a symmetric semantic edge pair at store time.
pub const SEMANTIC_THRESHOLD: f64 = 0.3;

/// Recall drops results scoring at or below this floor.
pub const RECALL_FLOOR: f64 = 0.2;

/// Score multiplier when the recall emotion matches the record's tag.
pub const EMOTION_BOOST: f64 = 1.5;

/// Per-evolution resonance gain for frequently accessed records.
pub const STRENGTHEN_FACTOR: f64 = 1.01;

/// Minimum access count before strengthening applies (exclusive).
pub const STRENGTHEN_MIN_ACCESS: u32 = 10;

/// Per-evolution resonance loss for records untouched for a week.
pub const FADE_FACTOR: f64 = 0.99;

/// Connections weaker than this are pruned during evolution.
pub const PRUNE_FLOOR: f64 = 0.1;

/// Counts of what one evolution pass touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EvolveStats {
    pub strengthened: usize,
    pub faded: usize,
    pub pruned: usize,
}

/// Aggregate view of the store contents.
#[derive(Clone, Debug, Serialize)]
pub struct Statistics {
    pub total_memories: usize,
    pub by_emotion: HashMap<String, usize>,
    pub total_connections: usize,
    /// Mean resonance across all records; 0 when the store is empty.
    pub average_resonance: f64,
}

/// SQLite-backed associative memory store.
///
/// Each mutating operation runs as one transaction: a reader never
/// observes a record mid-insert or the connection set mid-prune. The
/// store assumes a single writer; concurrent writers need external
/// serialization.
pub struct MemoryStore {
    conn: Connection,
}

impl MemoryStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Store ---

    /// Store new content with the default empty metadata.
    pub fn store(&self, content: &str, emotion: &str) -> Result<Uuid> {
        self.store_with(content, emotion, HashMap::new())
    }

    pub fn store_with(
        &self,
        content: &str,
        emotion: &str,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Uuid> {
        self.store_at(content, emotion, metadata, now_unix_secs())
    }

    /// Store at an explicit timestamp (tests and replay).
    ///
    /// The identifier derives deterministically from content and clock, so
    /// a colliding call overwrites the prior record (accepted risk). The
    /// new record gets symmetric semantic edges to every existing record
    /// whose similarity exceeds [`SEMANTIC_THRESHOLD`]; candidates come
    /// from the inverted token index, which is exact — a nonzero Jaccard
    /// score requires at least one shared token.
    pub fn store_at(
        &self,
        content: &str,
        emotion: &str,
        metadata: HashMap<String, serde_json::Value>,
        now: f64,
    ) -> Result<Uuid> {
        let id = derive_id(content, now);
        let id_str = id.to_string();
        let resonance = text::initial_resonance(content);
        let toks = text::token_set(content);
        let metadata_json = serde_json::to_string(&metadata)
            .map_err(|e| StoreError::InvalidData(format!("unserializable metadata: {e}")))?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO memories
             (id, content, emotion, timestamp, resonance, access_count, last_accessed, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![id_str, content, emotion, now, resonance, 0, now, metadata_json],
        )?;

        tx.execute("DELETE FROM tokens WHERE memory_id = ?1", [&id_str])?;
        {
            let mut insert_token =
                tx.prepare("INSERT INTO tokens (token, memory_id) VALUES (?1, ?2)")?;
            for token in &toks {
                insert_token.execute(params![token, id_str])?;
            }
        }

        let mut links = 0usize;
        {
            let candidates = candidate_ids(&tx, &toks, &id_str)?;
            let mut get_content = tx.prepare("SELECT content FROM memories WHERE id = ?1")?;
            let mut insert_edge = tx.prepare(
                "INSERT INTO connections (memory_id, connected_id, strength, kind)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for other_id in candidates {
                let other_content: String = get_content.query_row([&other_id], |row| row.get(0))?;
                let strength = text::similarity(content, &other_content);
                if strength > SEMANTIC_THRESHOLD {
                    let kind = ConnectionKind::Semantic.as_str();
                    insert_edge.execute(params![id_str, other_id, strength, kind])?;
                    insert_edge.execute(params![other_id, id_str, strength, kind])?;
                    links += 1;
                }
            }
        }

        tx.commit()?;
        tracing::debug!(%id, links, "stored memory");
        Ok(id)
    }

    // --- Recall ---

    /// Recall up to `limit` records resonating with `trigger`, strongest
    /// first. An `emotion` tag boosts matching records.
    pub fn recall(
        &self,
        trigger: &str,
        emotion: Option<&str>,
        limit: usize,
    ) -> Result<Vec<(MemoryRecord, f64)>> {
        self.recall_at(trigger, emotion, limit, now_unix_secs())
    }

    /// Recall against an explicit clock (tests and replay).
    ///
    /// Score = Jaccard(trigger, content), ×1.5 on emotion match, blended
    /// with recency as `0.5 + 0.5·e^(−Δt/86400)`. Results at or below the
    /// floor are dropped; ties break on ascending id. Exactly the
    /// returned records get their access counters bumped; the returned
    /// copies carry the pre-bump values.
    pub fn recall_at(
        &self,
        trigger: &str,
        emotion: Option<&str>,
        limit: usize,
        now: f64,
    ) -> Result<Vec<(MemoryRecord, f64)>> {
        let trigger_tokens = text::token_set(trigger);
        if trigger_tokens.is_empty() {
            return Ok(Vec::new());
        }

        let tx = self.conn.unchecked_transaction()?;

        let mut scored: Vec<(MemoryRecord, f64)> = Vec::new();
        for id_str in candidate_ids(&tx, &trigger_tokens, "")? {
            let record = load_record(&tx, &id_str)?;

            let mut score = text::jaccard(&trigger_tokens, &text::token_set(&record.content));
            if let Some(tag) = emotion
                && record.emotion == tag
            {
                score *= EMOTION_BOOST;
            }
            let recency = (-(now - record.last_accessed) / DAY_SECS).exp();
            score *= 0.5 + 0.5 * recency;

            if score > RECALL_FLOOR {
                scored.push((record, score));
            }
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));
        scored.truncate(limit);

        {
            let mut bump = tx.prepare(
                "UPDATE memories SET access_count = access_count + 1, last_accessed = ?1
                 WHERE id = ?2",
            )?;
            for (record, _) in &scored {
                bump.execute(params![now, record.id.to_string()])?;
            }
        }

        tx.commit()?;
        Ok(scored)
    }

    // --- Maintenance ---

    pub fn evolve(&self) -> Result<EvolveStats> {
        self.evolve_at(now_unix_secs())
    }

    /// One maintenance pass: strengthen frequently accessed records, fade
    /// week-stale ones, prune weak connections. Strengthening runs before
    /// fading, so a record can both gain and lose in the same pass.
    /// Never creates connections and never deletes records.
    pub fn evolve_at(&self, now: f64) -> Result<EvolveStats> {
        let tx = self.conn.unchecked_transaction()?;

        let strengthened = tx.execute(
            "UPDATE memories SET resonance = resonance * ?1 WHERE access_count > ?2",
            params![STRENGTHEN_FACTOR, STRENGTHEN_MIN_ACCESS],
        )?;
        let faded = tx.execute(
            "UPDATE memories SET resonance = resonance * ?1 WHERE last_accessed < ?2",
            params![FADE_FACTOR, now - WEEK_SECS],
        )?;
        let pruned = tx.execute(
            "DELETE FROM connections WHERE strength < ?1",
            [PRUNE_FLOOR],
        )?;

        tx.commit()?;
        let stats = EvolveStats {
            strengthened,
            faded,
            pruned,
        };
        tracing::debug!(?stats, "evolution pass");
        Ok(stats)
    }

    /// Dream pass: sample 2×pairs records without replacement, pair them
    /// consecutively, and for each pair flip a biased coin to create one
    /// directed dream edge with uniform strength in [0, max_strength).
    /// An edge identical in endpoints and kind is not inserted twice.
    /// Returns the number of edges created.
    pub fn dream(&self, config: &DreamConfig, rng: &mut impl Rng) -> Result<usize> {
        let mut ids: Vec<String> = {
            let mut stmt = self.conn.prepare("SELECT id FROM memories ORDER BY id")?;
            stmt.query_map([], |row| row.get(0))?
                .collect::<std::result::Result<_, _>>()?
        };

        let draw = (config.pairs * 2).min(ids.len());
        let (sampled, _) = ids.partial_shuffle(rng, draw);

        let tx = self.conn.unchecked_transaction()?;
        let mut created = 0usize;
        {
            let mut exists = tx.prepare(
                "SELECT EXISTS(
                     SELECT 1 FROM connections
                     WHERE memory_id = ?1 AND connected_id = ?2 AND kind = ?3
                 )",
            )?;
            let mut insert = tx.prepare(
                "INSERT INTO connections (memory_id, connected_id, strength, kind)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;

            for pair in sampled.chunks_exact(2) {
                if rng.random::<f64>() >= config.link_probability {
                    continue;
                }
                let strength = if config.max_strength > 0.0 {
                    rng.random_range(0.0..config.max_strength)
                } else {
                    0.0
                };
                let kind = ConnectionKind::Dream.as_str();
                let already: bool =
                    exists.query_row(params![pair[0], pair[1], kind], |row| row.get(0))?;
                if !already {
                    insert.execute(params![pair[0], pair[1], strength, kind])?;
                    created += 1;
                }
            }
        }
        tx.commit()?;

        tracing::debug!(created, "dream pass");
        Ok(created)
    }

    // --- Lookup ---

    pub fn get(&self, id: Uuid) -> Result<Option<MemoryRecord>> {
        let raw = self
            .conn
            .query_row(SELECT_RECORD, [id.to_string()], read_record_row)
            .optional()?;
        raw.map(row_to_record).transpose()
    }

    /// Outgoing connections of a record.
    pub fn connections_from(&self, id: Uuid) -> Result<Vec<MemoryConnection>> {
        let mut stmt = self.conn.prepare(
            "SELECT memory_id, connected_id, strength, kind
             FROM connections WHERE memory_id = ?1 ORDER BY rowid",
        )?;
        let rows: Vec<(String, String, f64, String)> = stmt
            .query_map([id.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(row_to_connection).collect()
    }

    pub fn all_memories(&self) -> Result<Vec<MemoryRecord>> {
        let ids: Vec<String> = {
            let mut stmt = self
                .conn
                .prepare("SELECT id FROM memories ORDER BY timestamp, id")?;
            stmt.query_map([], |row| row.get(0))?
                .collect::<std::result::Result<_, _>>()?
        };
        ids.iter()
            .map(|id_str| load_record(&self.conn, id_str))
            .collect()
    }

    pub fn all_connections(&self) -> Result<Vec<MemoryConnection>> {
        let mut stmt = self.conn.prepare(
            "SELECT memory_id, connected_id, strength, kind FROM connections ORDER BY rowid",
        )?;
        let rows: Vec<(String, String, f64, String)> = stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(row_to_connection).collect()
    }

    // --- Statistics ---

    pub fn get_statistics(&self) -> Result<Statistics> {
        let total_memories: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
        let total_connections: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM connections", [], |row| row.get(0))?;
        let average_resonance: f64 = self.conn.query_row(
            "SELECT COALESCE(AVG(resonance), 0.0) FROM memories",
            [],
            |row| row.get(0),
        )?;

        let mut by_emotion = HashMap::new();
        let mut stmt = self
            .conn
            .prepare("SELECT emotion, COUNT(*) FROM memories GROUP BY emotion")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (emotion, count) = row?;
            by_emotion.insert(emotion, count as usize);
        }

        Ok(Statistics {
            total_memories: total_memories as usize,
            by_emotion,
            total_connections: total_connections as usize,
            average_resonance,
        })
    }
}

/// Name-based UUID over content plus the clock's bit pattern: stable for
/// a given (content, instant), distinct across instants.
fn derive_id(content: &str, now: f64) -> Uuid {
    let mut name = Vec::with_capacity(content.len() + 8);
    name.extend_from_slice(content.as_bytes());
    name.extend_from_slice(&now.to_bits().to_be_bytes());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, &name)
}

/// Distinct ids of records sharing at least one token, via the inverted
/// index. Sorted for deterministic iteration.
fn candidate_ids(
    conn: &Connection,
    toks: &HashSet<String>,
    exclude: &str,
) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT memory_id FROM tokens WHERE token = ?1 AND memory_id != ?2")?;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for token in toks {
        let rows = stmt.query_map(params![token, exclude], |row| row.get::<_, String>(0))?;
        for row in rows {
            let id = row?;
            if seen.insert(id.clone()) {
                out.push(id);
            }
        }
    }
    out.sort();
    Ok(out)
}

const SELECT_RECORD: &str =
    "SELECT id, content, emotion, timestamp, resonance, access_count, last_accessed, metadata
     FROM memories WHERE id = ?1";

type RawRecord = (String, String, String, f64, f64, u32, f64, String);

fn read_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn row_to_record(raw: RawRecord) -> Result<MemoryRecord> {
    let (id_str, content, emotion, timestamp, resonance, access_count, last_accessed, metadata) =
        raw;
    Ok(MemoryRecord {
        id: parse_uuid(&id_str)?,
        content,
        emotion,
        timestamp,
        resonance,
        access_count,
        last_accessed,
        metadata: serde_json::from_str(&metadata)
            .map_err(|e| StoreError::InvalidData(format!("corrupt metadata: {e}")))?,
    })
}

fn load_record(conn: &Connection, id_str: &str) -> Result<MemoryRecord> {
    let raw = conn.query_row(SELECT_RECORD, [id_str], read_record_row)?;
    row_to_record(raw)
}

fn row_to_connection(
    (from, to, strength, kind): (String, String, f64, String),
) -> Result<MemoryConnection> {
    Ok(MemoryConnection {
        from: parse_uuid(&from)?,
        to: parse_uuid(&to)?,
        strength,
        kind: ConnectionKind::parse(&kind)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown connection kind '{kind}'")))?,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("invalid UUID '{s}': {e}")))
}
