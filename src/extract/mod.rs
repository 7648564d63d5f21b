//! Document-type-polymorphic field extraction.
//!
//! Each document type owns a parsing strategy with its own compiled pattern
//! set. Strategies register against the dispatch table; adding a new document
//! type never touches an existing strategy.

pub mod pan;

use std::sync::Arc;

use crate::model::{DocumentType, ExtractionResult};

/// Trait all parsing strategies implement.
pub trait FieldExtractor: Send + Sync {
    /// The document type this strategy handles.
    fn document_type(&self) -> DocumentType;

    /// Parse recognized text into structured fields. Callers guarantee the
    /// text is non-empty; a field whose pattern does not match is null.
    fn extract(&self, text: &str) -> ExtractionResult;
}

/// Placeholder strategy for document types whose field patterns are not
/// implemented yet. Keeps the raw text, yields no fields.
struct PlaceholderExtractor {
    document_type: DocumentType,
}

impl FieldExtractor for PlaceholderExtractor {
    fn document_type(&self) -> DocumentType {
        self.document_type
    }

    fn extract(&self, text: &str) -> ExtractionResult {
        ExtractionResult::with_raw(text)
    }
}

/// Dispatch table mapping document types to their parsing strategy.
pub struct ExtractorRegistry {
    strategies: Vec<Arc<dyn FieldExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Registry with all built-in strategies.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(pan::PanExtractor::new()));
        registry.register(Arc::new(PlaceholderExtractor {
            document_type: DocumentType::Aadhaar,
        }));
        registry.register(Arc::new(PlaceholderExtractor {
            document_type: DocumentType::Passport,
        }));
        registry
    }

    /// Register a strategy. A later registration for the same document type
    /// wins, so built-ins can be overridden without editing them.
    pub fn register(&mut self, strategy: Arc<dyn FieldExtractor>) {
        self.strategies
            .retain(|s| s.document_type() != strategy.document_type());
        self.strategies.push(strategy);
    }

    fn get(&self, document_type: DocumentType) -> Option<&Arc<dyn FieldExtractor>> {
        self.strategies
            .iter()
            .find(|s| s.document_type() == document_type)
    }

    /// Extract fields from recognized text for the given document type.
    ///
    /// Empty or absent text short-circuits to the null result without
    /// invoking any pattern. A document type with no registered strategy
    /// yields an empty result carrying the raw text.
    pub fn extract(&self, document_type: DocumentType, text: Option<&str>) -> ExtractionResult {
        let raw = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return ExtractionResult::null(),
        };

        match self.get(document_type) {
            Some(strategy) => strategy.extract(raw),
            None => ExtractionResult::with_raw(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_short_circuits_to_null() {
        let registry = ExtractorRegistry::with_defaults();
        for doc in [
            DocumentType::Pan,
            DocumentType::Aadhaar,
            DocumentType::Passport,
            DocumentType::Unknown,
        ] {
            assert_eq!(registry.extract(doc, None), ExtractionResult::null());
            assert_eq!(registry.extract(doc, Some("")), ExtractionResult::null());
            assert_eq!(
                registry.extract(doc, Some("   \n ")),
                ExtractionResult::null()
            );
        }
    }

    #[test]
    fn test_unknown_document_type_yields_empty_result() {
        let registry = ExtractorRegistry::with_defaults();
        let result = registry.extract(DocumentType::Unknown, Some("whatever the engine saw"));
        assert!(result.fields.is_empty());
        assert_eq!(result.raw_text.as_deref(), Some("whatever the engine saw"));
    }

    #[test]
    fn test_placeholder_strategies_yield_empty_fields() {
        let registry = ExtractorRegistry::with_defaults();
        let result = registry.extract(DocumentType::Aadhaar, Some("1234 5678 9012"));
        assert!(result.fields.is_empty());
        assert!(result.raw_text.is_some());
    }

    #[test]
    fn test_later_registration_replaces_strategy() {
        struct Always;
        impl FieldExtractor for Always {
            fn document_type(&self) -> DocumentType {
                DocumentType::Aadhaar
            }
            fn extract(&self, text: &str) -> ExtractionResult {
                let mut result = ExtractionResult::with_raw(text);
                result.set_field("marker", Some("set".to_string()));
                result
            }
        }

        let mut registry = ExtractorRegistry::with_defaults();
        registry.register(Arc::new(Always));

        let result = registry.extract(DocumentType::Aadhaar, Some("anything"));
        assert_eq!(result.field("marker"), Some("set"));
    }
}
