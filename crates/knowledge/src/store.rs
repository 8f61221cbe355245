//! Document store: loads the policy corpus declared by a manifest.
//!
//! The manifest is a fixed list of `(path, status, version, year)` entries.
//! Every listed file must load; a missing policy file is fatal because
//! silently dropping it could hide the draft/old distinction the lifecycle
//! filter depends on.

use crate::types::{LifecycleStatus, PolicyDocument};
use policy_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Path as written; becomes the document id and source
    pub path: String,

    pub status: LifecycleStatus,

    pub version: u32,

    pub year: i32,
}

/// The list of policy documents that make up the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusManifest {
    pub documents: Vec<DocumentSpec>,
}

impl CorpusManifest {
    /// The reference corpus: one superseded, one active and one draft policy.
    pub fn reference() -> Self {
        Self {
            documents: vec![
                DocumentSpec {
                    path: "data/policy_v1_2020.txt".to_string(),
                    status: LifecycleStatus::Old,
                    version: 1,
                    year: 2020,
                },
                DocumentSpec {
                    path: "data/policy_v2_2023.txt".to_string(),
                    status: LifecycleStatus::Active,
                    version: 2,
                    year: 2023,
                },
                DocumentSpec {
                    path: "data/policy_future_DRAFT_v3.txt".to_string(),
                    status: LifecycleStatus::Draft,
                    version: 3,
                    year: 2026,
                },
            ],
        }
    }

    /// Parse a manifest from a YAML file.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::DocumentLoad(format!("Failed to read corpus manifest {:?}: {}", path, e))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            AppError::DocumentLoad(format!("Failed to parse corpus manifest {:?}: {}", path, e))
        })
    }

    /// Load the manifest at `path`, or the reference manifest if it does not exist.
    pub fn load_or_reference(path: &Path) -> AppResult<Self> {
        if path.exists() {
            tracing::debug!("Loading corpus manifest from {:?}", path);
            Self::from_path(path)
        } else {
            tracing::debug!(
                "No corpus manifest at {:?}, using the reference corpus",
                path
            );
            Ok(Self::reference())
        }
    }
}

/// Loads policy documents relative to a base directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    base_dir: PathBuf,
    manifest: CorpusManifest,
}

impl DocumentStore {
    pub fn new(base_dir: impl Into<PathBuf>, manifest: CorpusManifest) -> Self {
        Self {
            base_dir: base_dir.into(),
            manifest,
        }
    }

    /// Read every manifest entry into a `PolicyDocument`, in manifest order.
    ///
    /// # Errors
    /// `AppError::DocumentLoad` if any file is missing, unreadable or not
    /// UTF-8, or if two entries resolve to the same document.
    pub fn load(&self) -> AppResult<Vec<PolicyDocument>> {
        let mut documents = Vec::with_capacity(self.manifest.documents.len());
        let mut seen_ids: HashMap<&str, usize> = HashMap::new();
        let mut seen_files: HashMap<PathBuf, &str> = HashMap::new();

        for (position, spec) in self.manifest.documents.iter().enumerate() {
            if let Some(first) = seen_ids.insert(spec.path.as_str(), position) {
                return Err(AppError::DocumentLoad(format!(
                    "Duplicate document id '{}' (manifest entries {} and {})",
                    spec.path,
                    first + 1,
                    position + 1
                )));
            }

            let full_path = self.resolve(&spec.path);
            let canonical = fs::canonicalize(&full_path).map_err(|e| {
                AppError::DocumentLoad(format!(
                    "Policy file '{}' is missing or unreadable ({:?}): {}",
                    spec.path, full_path, e
                ))
            })?;

            if let Some(other) = seen_files.insert(canonical.clone(), spec.path.as_str()) {
                return Err(AppError::DocumentLoad(format!(
                    "Manifest entries '{}' and '{}' resolve to the same file {:?}",
                    other, spec.path, canonical
                )));
            }

            let content = fs::read_to_string(&canonical).map_err(|e| {
                AppError::DocumentLoad(format!(
                    "Failed to read policy file '{}': {}",
                    spec.path, e
                ))
            })?;

            let document = PolicyDocument::new(
                spec.path.clone(),
                content,
                spec.status,
                spec.version,
                spec.year,
            )?;

            tracing::debug!(
                source = %spec.path,
                status = %spec.status,
                version = spec.version,
                year = spec.year,
                "Loaded policy document"
            );

            documents.push(document);
        }

        tracing::info!("Loaded {} policy documents", documents.len());
        Ok(documents)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn write_reference_corpus(dir: &Path) {
        write(dir, "data/policy_v1_2020.txt", "Remote work: 1 day per week.");
        write(dir, "data/policy_v2_2023.txt", "Remote work: 2 days per week.");
        write(
            dir,
            "data/policy_future_DRAFT_v3.txt",
            "Proposed remote work: 3 days per week.",
        );
    }

    #[test]
    fn test_load_reference_corpus() {
        let temp = TempDir::new().unwrap();
        write_reference_corpus(temp.path());

        let store = DocumentStore::new(temp.path(), CorpusManifest::reference());
        let docs = store.load().unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].id(), "data/policy_v1_2020.txt");
        assert_eq!(docs[1].metadata().source, "data/policy_v2_2023.txt");
        assert_eq!(docs[1].content(), "Remote work: 2 days per week.");
        assert_eq!(docs[2].status(), LifecycleStatus::Draft);
        assert_eq!(docs[2].metadata().year, 2026);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "data/policy_v1_2020.txt", "old");
        write(temp.path(), "data/policy_v2_2023.txt", "active");

        let store = DocumentStore::new(temp.path(), CorpusManifest::reference());
        let err = store.load().unwrap_err();

        assert!(matches!(err, AppError::DocumentLoad(_)));
        assert!(err.to_string().contains("policy_future_DRAFT_v3.txt"));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", "text");

        let spec = DocumentSpec {
            path: "a.txt".to_string(),
            status: LifecycleStatus::Active,
            version: 1,
            year: 2024,
        };
        let manifest = CorpusManifest {
            documents: vec![spec.clone(), spec],
        };

        let err = DocumentStore::new(temp.path(), manifest).load().unwrap_err();
        assert!(err.to_string().contains("Duplicate document id"));
    }

    #[test]
    fn test_aliased_paths_are_rejected() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "data/a.txt", "text");

        let manifest = CorpusManifest {
            documents: vec![
                DocumentSpec {
                    path: "data/a.txt".to_string(),
                    status: LifecycleStatus::Active,
                    version: 2,
                    year: 2024,
                },
                DocumentSpec {
                    path: "./data/a.txt".to_string(),
                    status: LifecycleStatus::Draft,
                    version: 3,
                    year: 2026,
                },
            ],
        };

        let err = DocumentStore::new(temp.path(), manifest).load().unwrap_err();
        assert!(err.to_string().contains("resolve to the same file"));
    }

    #[test]
    fn test_non_utf8_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("bin.txt"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let manifest = CorpusManifest {
            documents: vec![DocumentSpec {
                path: "bin.txt".to_string(),
                status: LifecycleStatus::Active,
                version: 1,
                year: 2024,
            }],
        };

        let err = DocumentStore::new(temp.path(), manifest).load().unwrap_err();
        assert!(matches!(err, AppError::DocumentLoad(_)));
    }

    #[test]
    fn test_manifest_yaml() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("corpus.yaml");
        fs::write(
            &manifest_path,
            r#"
documents:
  - path: data/travel_2024.txt
    status: active
    version: 4
    year: 2024
  - path: data/travel_2019.txt
    status: old
    version: 3
    year: 2019
"#,
        )
        .unwrap();

        let manifest = CorpusManifest::load_or_reference(&manifest_path).unwrap();
        assert_eq!(manifest.documents.len(), 2);
        assert_eq!(manifest.documents[1].status, LifecycleStatus::Old);
    }

    #[test]
    fn test_manifest_falls_back_to_reference() {
        let temp = TempDir::new().unwrap();
        let manifest =
            CorpusManifest::load_or_reference(&temp.path().join("missing.yaml")).unwrap();
        assert_eq!(manifest, CorpusManifest::reference());
    }

    #[test]
    fn test_manifest_with_unknown_status_is_rejected() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("corpus.yaml");
        fs::write(
            &manifest_path,
            "documents:\n  - path: a.txt\n    status: retired\n    version: 1\n    year: 2020\n",
        )
        .unwrap();

        let err = CorpusManifest::from_path(&manifest_path).unwrap_err();
        assert!(matches!(err, AppError::DocumentLoad(_)));
    }
}
