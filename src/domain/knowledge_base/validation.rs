use thiserror::Error;

/// Maximum length of a knowledge base identifier
const MAX_ID_LENGTH: usize = 50;

/// Validation errors for knowledge base identifiers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KnowledgeBaseValidationError {
    #[error("Knowledge base ID cannot be empty")]
    Empty,

    #[error("Knowledge base ID cannot exceed {MAX_ID_LENGTH} characters")]
    TooLong,

    #[error("Knowledge base ID can only contain alphanumeric characters, hyphens, and underscores")]
    InvalidCharacters,

    #[error("Unknown retrieval preset '{0}', expected broad, balanced, or precise")]
    UnknownPreset(String),
}

/// Validate a knowledge base identifier.
///
/// The id names a vector collection in the backing store, so it is restricted
/// to characters that are safe in table names and file paths.
pub fn validate_knowledge_base_id(id: &str) -> Result<(), KnowledgeBaseValidationError> {
    if id.is_empty() {
        return Err(KnowledgeBaseValidationError::Empty);
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(KnowledgeBaseValidationError::TooLong);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(KnowledgeBaseValidationError::InvalidCharacters);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(validate_knowledge_base_id("legal-docs").is_ok());
        assert!(validate_knowledge_base_id("kb_2024").is_ok());
        assert!(validate_knowledge_base_id("a").is_ok());
    }

    #[test]
    fn test_empty_id() {
        assert_eq!(
            validate_knowledge_base_id(""),
            Err(KnowledgeBaseValidationError::Empty)
        );
    }

    #[test]
    fn test_too_long_id() {
        let id = "a".repeat(51);
        assert_eq!(
            validate_knowledge_base_id(&id),
            Err(KnowledgeBaseValidationError::TooLong)
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            validate_knowledge_base_id("legal docs"),
            Err(KnowledgeBaseValidationError::InvalidCharacters)
        );
        assert_eq!(
            validate_knowledge_base_id("../escape"),
            Err(KnowledgeBaseValidationError::InvalidCharacters)
        );
    }
}
