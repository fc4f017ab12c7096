//! Error types for Project Ember.

use thiserror::Error;

use crate::ids::{AbilityId, ItemId, MonsterId};

/// Top-level error type for Ember operations that cross crate boundaries.
#[derive(Debug, Error)]
pub enum EmberError {
    /// A content table refers to a definition that does not exist
    #[error("Missing definition: {0}")]
    MissingDefinition(#[from] DefinitionRef),
}

/// A reference to a content definition, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DefinitionRef {
    /// Item definition
    #[error("{0}")]
    Item(ItemId),
    /// Ability definition
    #[error("{0}")]
    Ability(AbilityId),
    /// Monster definition
    #[error("{0}")]
    Monster(MonsterId),
}

/// Result type alias for Ember operations.
pub type EmberResult<T> = Result<T, EmberError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_definition_message() {
        let err: EmberError = DefinitionRef::Item(ItemId::new(4)).into();
        assert_eq!(err.to_string(), "Missing definition: item:4");
    }
}
