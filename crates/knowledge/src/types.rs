//! Policy corpus type definitions.

use policy_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// Superseded; retrievable but never citable
    Old,
    /// Currently in effect
    Active,
    /// Proposed, not yet effective
    Draft,
}

impl LifecycleStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::Active => "active",
            Self::Draft => "draft",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "old" => Ok(Self::Old),
            "active" => Ok(Self::Active),
            "draft" => Ok(Self::Draft),
            other => Err(AppError::Serialization(format!(
                "Unknown lifecycle status: '{}'",
                other
            ))),
        }
    }
}

/// Lifecycle metadata attached to every policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub status: LifecycleStatus,

    /// Policy version, starting at 1
    pub version: u32,

    /// Year the version was issued (or is planned for)
    pub year: i32,

    /// Source identifier; equal to the owning document's id
    pub source: String,
}

/// A policy document loaded from the corpus.
///
/// Immutable after construction; `id()` always equals `metadata().source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    id: String,
    content: String,
    metadata: DocumentMetadata,
}

impl PolicyDocument {
    /// Create a document whose id and source are both `source`.
    pub fn new(
        source: impl Into<String>,
        content: impl Into<String>,
        status: LifecycleStatus,
        version: u32,
        year: i32,
    ) -> AppResult<Self> {
        let source = source.into();

        if source.trim().is_empty() {
            return Err(AppError::DocumentLoad(
                "Document source cannot be empty".to_string(),
            ));
        }

        if version < 1 {
            return Err(AppError::DocumentLoad(format!(
                "Document '{}' has version {}; versions start at 1",
                source, version
            )));
        }

        Ok(Self {
            id: source.clone(),
            content: content.into(),
            metadata: DocumentMetadata {
                status,
                version,
                year,
                source,
            },
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn status(&self) -> LifecycleStatus {
        self.metadata.status
    }
}

/// One retrieval hit for a single query, in rank order within its sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMatch {
    pub metadata: DocumentMetadata,

    pub content: String,

    /// Cosine similarity to the query (informational only)
    pub score: f32,
}

impl RetrievedMatch {
    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    pub fn status(&self) -> LifecycleStatus {
        self.metadata.status
    }
}

/// Per-query gate controlling whether draft policies may be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMode {
    ActiveOnly,
    IncludeDraft,
}

impl VisibilityMode {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActiveOnly => "active_only",
            Self::IncludeDraft => "include_draft",
        }
    }
}

impl fmt::Display for VisibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grounded answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated answer, verbatim
    pub text: String,

    /// Deduplicated sources of the documents in the answer context,
    /// in first-occurrence (rank) order
    pub sources: Vec<String>,
}
