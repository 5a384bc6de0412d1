//! Knowledge base entity and related types

use serde::{Deserialize, Serialize};

use super::validation::{validate_knowledge_base_id, KnowledgeBaseValidationError};

/// Knowledge base identifier - alphanumeric + hyphens/underscores, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KnowledgeBaseId(String);

impl KnowledgeBaseId {
    /// Create a new KnowledgeBaseId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, KnowledgeBaseValidationError> {
        let id = id.into();
        validate_knowledge_base_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KnowledgeBaseId {
    type Error = KnowledgeBaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KnowledgeBaseId> for String {
    fn from(id: KnowledgeBaseId) -> Self {
        id.0
    }
}

impl std::fmt::Display for KnowledgeBaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A retrieval-sized fragment of a document, returned by a relevance query.
///
/// Exists only for the duration of one query-to-response cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Parent document id
    pub doc_id: String,
    /// Chunk text content
    pub content: String,
    /// Relevance score, higher is more relevant
    pub score: f32,
}

impl RetrievedChunk {
    pub fn new(doc_id: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        Self {
            doc_id: doc_id.into(),
            content: content.into(),
            score,
        }
    }
}

/// Named retrieval configuration controlling how many and which chunks a
/// query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalPreset {
    /// Many results, no relevance floor
    Broad,
    /// Moderate number of results with a mild relevance floor
    #[default]
    Balanced,
    /// Few, high-confidence results
    Precise,
}

impl RetrievalPreset {
    /// Number of chunks the preset asks the store for
    pub fn top_k(&self) -> usize {
        match self {
            Self::Broad => 10,
            Self::Balanced => 5,
            Self::Precise => 3,
        }
    }

    /// Minimum relevance score a chunk must reach to be returned
    pub fn min_score(&self) -> f32 {
        match self {
            Self::Broad => 0.0,
            Self::Balanced => 0.25,
            Self::Precise => 0.5,
        }
    }
}

impl std::str::FromStr for RetrievalPreset {
    type Err = KnowledgeBaseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broad" => Ok(Self::Broad),
            "balanced" => Ok(Self::Balanced),
            "precise" => Ok(Self::Precise),
            other => Err(KnowledgeBaseValidationError::UnknownPreset(
                other.to_string(),
            )),
        }
    }
}

impl std::fmt::Display for RetrievalPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Broad => write!(f, "broad"),
            Self::Balanced => write!(f, "balanced"),
            Self::Precise => write!(f, "precise"),
        }
    }
}
