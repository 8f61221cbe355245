//! SQLite-backed vector index for policy documents.

use crate::embeddings::cosine_similarity;
use crate::types::{DocumentMetadata, LifecycleStatus, RetrievedMatch};
use crate::vector_index::{IndexEntry, VectorIndex};
use policy_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    status TEXT NOT NULL,
    version INTEGER NOT NULL CHECK (version >= 1),
    year INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL
);
"#;

/// Vector index storing one row per document and ranking by cosine
/// similarity with a full scan.
#[derive(Debug)]
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Open a transient in-memory index.
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to open in-memory index: {}", e))
        })?;
        Self::init(conn)
    }

    /// Open (or create) a file-backed index.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::RetrievalUnavailable(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to open SQLite index: {}", e))
        })?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Self::init(conn)
    }

    fn init(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA).map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to create tables: {}", e))
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::RetrievalUnavailable("Index lock poisoned".to_string()))
    }

    fn conn_mut(&mut self) -> AppResult<&mut Connection> {
        self.conn
            .get_mut()
            .map_err(|_| AppError::RetrievalUnavailable("Index lock poisoned".to_string()))
    }
}

impl VectorIndex for SqliteIndex {
    fn replace_all(&mut self, entries: &[IndexEntry<'_>]) -> AppResult<()> {
        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to begin index transaction: {}", e))
        })?;

        tx.execute("DELETE FROM documents", [])
            .map_err(|e| AppError::RetrievalUnavailable(format!("Failed to reset index: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO documents (id, source, status, version, year, content, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(|e| {
                    AppError::RetrievalUnavailable(format!("Failed to prepare insert: {}", e))
                })?;

            for entry in entries {
                stmt.execute(params![
                    entry.id,
                    entry.metadata.source,
                    entry.metadata.status.as_str(),
                    entry.metadata.version as i64,
                    entry.metadata.year as i64,
                    entry.content,
                    embedding_to_bytes(entry.embedding),
                ])
                .map_err(|e| {
                    AppError::RetrievalUnavailable(format!(
                        "Failed to insert document {}: {}",
                        entry.id, e
                    ))
                })?;
            }
        }

        // Dropping an uncommitted transaction rolls it back
        tx.commit().map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to commit index: {}", e))
        })?;

        tracing::debug!("Indexed {} policy documents", entries.len());
        Ok(())
    }

    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<RetrievedMatch>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT source, status, version, year, content, embedding
                 FROM documents ORDER BY rowid",
            )
            .map_err(|e| AppError::RetrievalUnavailable(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Vec<u8>>(5)?,
                ))
            })
            .map_err(|e| AppError::RetrievalUnavailable(format!("Failed to query documents: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let (source, status, version, year, content, bytes) = row.map_err(|e| {
                AppError::RetrievalUnavailable(format!("Failed to read document row: {}", e))
            })?;

            let status: LifecycleStatus = status
                .parse()
                .map_err(|e| AppError::RetrievalUnavailable(format!("Corrupt index row: {}", e)))?;
            let embedding = bytes_to_embedding(&bytes)?;
            let score = cosine_similarity(query_embedding, &embedding);

            results.push(RetrievedMatch {
                metadata: DocumentMetadata {
                    status,
                    version: version as u32,
                    year: year as i32,
                    source,
                },
                content,
                score,
            });
        }

        // Stable sort: equal scores keep insertion order
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        tracing::debug!(
            "Retrieved {} documents (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    fn len(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM documents", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as usize)
        .map_err(|e| AppError::RetrievalUnavailable(format!("Failed to count documents: {}", e)))
    }
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::RetrievalUnavailable(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn metadata(source: &str, status: LifecycleStatus, version: u32) -> DocumentMetadata {
        DocumentMetadata {
            status,
            version,
            year: 2020 + version as i32,
            source: source.to_string(),
        }
    }

    fn entry<'a>(
        id: &'a str,
        embedding: &'a [f32],
        metadata: &'a DocumentMetadata,
    ) -> IndexEntry<'a> {
        IndexEntry {
            id,
            embedding,
            metadata,
            content: id,
        }
    }

    fn seeded() -> SqliteIndex {
        let v1 = metadata("v1", LifecycleStatus::Old, 1);
        let v2 = metadata("v2", LifecycleStatus::Active, 2);
        let v3 = metadata("v3", LifecycleStatus::Draft, 3);

        let mut index = SqliteIndex::in_memory().unwrap();
        index
            .replace_all(&[
                entry("v1", &[1.0, 0.0, 0.0], &v1),
                entry("v2", &[0.8, 0.6, 0.0], &v2),
                entry("v3", &[0.0, 0.0, 1.0], &v3),
            ])
            .unwrap();
        index
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = seeded();
        let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();

        let sources: Vec<&str> = results.iter().map(|m| m.source()).collect();
        assert_eq!(sources, vec!["v1", "v2", "v3"]);
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[1].status(), LifecycleStatus::Active);
        assert_eq!(results[1].content, "v2");
        assert_eq!(results[2].metadata.year, 2023);
    }

    #[test]
    fn test_search_truncates_to_top_k() {
        let index = seeded();
        assert_eq!(index.search(&[0.0, 0.0, 1.0], 1).unwrap().len(), 1);
        assert_eq!(index.search(&[0.0, 0.0, 1.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let metas: Vec<_> = ["b", "a", "c"]
            .iter()
            .map(|id| metadata(id, LifecycleStatus::Active, 1))
            .collect();
        let entries: Vec<_> = metas
            .iter()
            .map(|m| entry(&m.source, &[1.0, 0.0], m))
            .collect();

        let mut index = SqliteIndex::in_memory().unwrap();
        index.replace_all(&entries).unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        let sources: Vec<&str> = results.iter().map(|m| m.source()).collect();
        assert_eq!(sources, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_replace_all_swaps_content() {
        let mut index = seeded();
        assert_eq!(index.len().unwrap(), 3);

        let v2 = metadata("v2", LifecycleStatus::Active, 2);
        index.replace_all(&[entry("v2", &[0.0, 1.0, 0.0], &v2)]).unwrap();
        assert_eq!(index.len().unwrap(), 1);

        index.replace_all(&[]).unwrap();
        assert!(index.is_empty().unwrap());
        assert!(index.search(&[1.0, 0.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_failed_replace_keeps_previous_content() {
        let mut index = seeded();

        let good = metadata("v4", LifecycleStatus::Active, 4);
        let bad = metadata("v5", LifecycleStatus::Active, 0);
        let err = index
            .replace_all(&[
                entry("v4", &[1.0, 0.0, 0.0], &good),
                entry("v5", &[1.0, 0.0, 0.0], &bad),
            ])
            .unwrap_err();
        assert!(matches!(err, AppError::RetrievalUnavailable(_)));

        assert_eq!(index.len().unwrap(), 3);
        let sources: Vec<String> = index
            .search(&[1.0, 0.0, 0.0], 3)
            .unwrap()
            .iter()
            .map(|m| m.source().to_string())
            .collect();
        assert_eq!(sources, vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn test_file_backed_index_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index/policies.db");
        let v2 = metadata("v2", LifecycleStatus::Active, 2);

        {
            let mut index = SqliteIndex::open(&path).unwrap();
            index.replace_all(&[entry("v2", &[0.5, 0.5], &v2)]).unwrap();
        }

        let index = SqliteIndex::open(&path).unwrap();
        assert_eq!(index.len().unwrap(), 1);
    }

    #[test]
    fn test_embedding_bytes_round_trip() {
        let embedding = vec![0.25, -1.5, 3.0];
        let bytes = embedding_to_bytes(&embedding);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), embedding);
        assert!(bytes_to_embedding(&bytes[..5]).is_err());
    }
}
