//! PAN card parsing strategy.
//!
//! PAN cards print bilingual labels, Devanagari first, then the English
//! label, then the value. Patterns compile once and are reused across
//! requests. Every field is scanned independently over the full text, first
//! match only; a miss on one field never blocks the others.

use regex::Regex;
use std::sync::LazyLock;

use super::FieldExtractor;
use crate::model::{DocumentType, ExtractionResult};

pub const FIELD_DOCUMENT_NUMBER: &str = "document_number";
pub const FIELD_NAME: &str = "name";
pub const FIELD_FATHER_NAME: &str = "father_name";
pub const FIELD_DATE_OF_BIRTH: &str = "date_of_birth";

/// The permanent account number: five uppercase letters, four digits, one
/// uppercase letter. Matching is case-sensitive; an engine that lowercases
/// the code will not match. Known limitation.
static DOCUMENT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]{5}[0-9]{4}[A-Z])").unwrap());

/// Holder name after the bilingual label. The value is a run of ASCII word
/// characters and spaces, terminated by the line break or the next label.
static HOLDER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:नाम\s*/\s*)?Name\s*([A-Za-z0-9_][A-Za-z0-9_ ]*)").unwrap());

static FATHER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:पिता का नाम\s*/\s*)?Father's Name\s*([A-Za-z0-9_][A-Za-z0-9_ ]*)").unwrap()
});

static DATE_OF_BIRTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:जन्म की तारीख\s*/\s*)?Date of Birth\s*([0-9/]+)").unwrap());

pub struct PanExtractor;

impl PanExtractor {
    pub fn new() -> Self {
        Self
    }

    fn document_number(text: &str) -> Option<String> {
        DOCUMENT_NUMBER
            .captures(text)
            .and_then(|caps| trimmed_capture(&caps))
    }

    /// The guardian label also ends in "Name", so candidate matches preceded
    /// by it are skipped rather than mistaken for the holder name.
    fn holder_name(text: &str) -> Option<String> {
        for caps in HOLDER_NAME.captures_iter(text) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let preceding = text[..start].trim_end();
            if preceding.ends_with("Father's") || preceding.ends_with("पिता का") {
                continue;
            }
            return trimmed_capture(&caps);
        }
        None
    }

    fn father_name(text: &str) -> Option<String> {
        FATHER_NAME
            .captures(text)
            .and_then(|caps| trimmed_capture(&caps))
    }

    fn date_of_birth(text: &str) -> Option<String> {
        DATE_OF_BIRTH
            .captures(text)
            .and_then(|caps| trimmed_capture(&caps))
    }
}

impl FieldExtractor for PanExtractor {
    fn document_type(&self) -> DocumentType {
        DocumentType::Pan
    }

    fn extract(&self, text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::with_raw(text);
        result.set_field(FIELD_DOCUMENT_NUMBER, Self::document_number(text));
        result.set_field(FIELD_NAME, Self::holder_name(text));
        result.set_field(FIELD_FATHER_NAME, Self::father_name(text));
        result.set_field(FIELD_DATE_OF_BIRTH, Self::date_of_birth(text));
        result
    }
}

fn trimmed_capture(caps: &regex::Captures<'_>) -> Option<String> {
    caps.get(1)
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CARD: &str = "आयकर विभाग INCOME TAX DEPARTMENT\n\
        स्थायी लेखा संख्या कार्ड\n\
        ABCDE1234F\n\
        नाम / Name\n\
        RAHUL KUMAR\n\
        पिता का नाम / Father's Name\n\
        SURESH KUMAR\n\
        जन्म की तारीख / Date of Birth\n\
        01/01/1990";

    fn extract(text: &str) -> ExtractionResult {
        PanExtractor::new().extract(text)
    }

    #[test]
    fn test_full_card_extracts_every_field() {
        let result = extract(FULL_CARD);
        assert_eq!(result.field(FIELD_DOCUMENT_NUMBER), Some("ABCDE1234F"));
        assert_eq!(result.field(FIELD_NAME), Some("RAHUL KUMAR"));
        assert_eq!(result.field(FIELD_FATHER_NAME), Some("SURESH KUMAR"));
        assert_eq!(result.field(FIELD_DATE_OF_BIRTH), Some("01/01/1990"));
        assert_eq!(result.raw_text.as_deref(), Some(FULL_CARD));
    }

    #[test]
    fn test_missing_dob_leaves_other_fields_intact() {
        let text = "ABCDE1234F\nनाम / Name\nRAHUL KUMAR";
        let result = extract(text);
        assert_eq!(result.field(FIELD_DOCUMENT_NUMBER), Some("ABCDE1234F"));
        assert_eq!(result.field(FIELD_NAME), Some("RAHUL KUMAR"));
        assert_eq!(result.field(FIELD_DATE_OF_BIRTH), None);
        assert_eq!(result.field(FIELD_FATHER_NAME), None);
    }

    #[test]
    fn test_lowercased_document_number_does_not_match() {
        let result = extract("abcde1234f\nनाम / Name\nRAHUL");
        assert_eq!(result.field(FIELD_DOCUMENT_NUMBER), None);
        assert_eq!(result.field(FIELD_NAME), Some("RAHUL"));
    }

    #[test]
    fn test_holder_name_not_taken_from_guardian_label() {
        let text = "ABCDE1234F\nपिता का नाम / Father's Name\nSURESH KUMAR";
        let result = extract(text);
        assert_eq!(result.field(FIELD_NAME), None);
        assert_eq!(result.field(FIELD_FATHER_NAME), Some("SURESH KUMAR"));
    }

    #[test]
    fn test_english_only_labels_still_match() {
        let text = "Name RAVI VERMA\nFather's Name MOHAN VERMA\nDate of Birth 15/08/1985";
        let result = extract(text);
        assert_eq!(result.field(FIELD_NAME), Some("RAVI VERMA"));
        assert_eq!(result.field(FIELD_FATHER_NAME), Some("MOHAN VERMA"));
        assert_eq!(result.field(FIELD_DATE_OF_BIRTH), Some("15/08/1985"));
    }

    #[test]
    fn test_values_are_trimmed() {
        let text = "जन्म की तारीख / Date of Birth   07/03/1979  ";
        let result = extract(text);
        assert_eq!(result.field(FIELD_DATE_OF_BIRTH), Some("07/03/1979"));
    }

    #[test]
    fn test_garbage_text_yields_all_null_fields() {
        let result = extract("%%% unreadable scan %%%");
        assert_eq!(result.field(FIELD_DOCUMENT_NUMBER), None);
        assert_eq!(result.field(FIELD_NAME), None);
        assert_eq!(result.field(FIELD_FATHER_NAME), None);
        assert_eq!(result.field(FIELD_DATE_OF_BIRTH), None);
        // fields are present in the mapping, just null
        assert_eq!(result.fields.len(), 4);
    }
}
