//! Document vault reconciliation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of supporting document, e.g. `land_record` or `bank_passbook`
///
/// Stored normalised (lower snake case) so that "Land Record" and
/// "land_record" name the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentType(String);

impl DocumentType {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw
            .as_ref()
            .trim()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label ("land_record" -> "Land Record")
    pub fn display_name(&self) -> String {
        self.0
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentType {
    fn from(value: &str) -> Self {
        DocumentType::new(value)
    }
}

/// Server snapshot of which documents are attached to a claim
///
/// Completeness is derived from the missing set and cannot be set on its
/// own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReconciliation {
    attached: BTreeSet<DocumentType>,
    missing: BTreeSet<DocumentType>,
    checked_at: DateTime<Utc>,
}

impl DocumentReconciliation {
    pub fn new(
        attached: impl IntoIterator<Item = DocumentType>,
        missing: impl IntoIterator<Item = DocumentType>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            attached: attached.into_iter().collect(),
            missing: missing.into_iter().collect(),
            checked_at,
        }
    }

    pub fn attached(&self) -> &BTreeSet<DocumentType> {
        &self.attached
    }

    pub fn missing(&self) -> &BTreeSet<DocumentType> {
        &self.missing
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn is_missing(&self, document_type: &DocumentType) -> bool {
        self.missing.contains(document_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_normalisation() {
        assert_eq!(DocumentType::new(" Land Record "), DocumentType::new("land_record"));
        assert_eq!(DocumentType::new("bank-passbook").as_str(), "bank_passbook");
        assert_eq!(DocumentType::new("aadhaar_card").display_name(), "Aadhaar Card");
    }

    #[test]
    fn test_completeness_follows_missing_set() {
        let now = Utc::now();
        let partial = DocumentReconciliation::new(
            vec!["aadhaar".into()],
            vec!["land_record".into()],
            now,
        );
        assert!(!partial.is_complete());
        assert!(partial.is_missing(&"land_record".into()));
        assert_eq!(partial.attached_count(), 1);

        let done = DocumentReconciliation::new(vec!["aadhaar".into()], Vec::new(), now);
        assert!(done.is_complete());
    }

    #[test]
    fn test_duplicates_collapse() {
        let rec = DocumentReconciliation::new(
            vec!["aadhaar".into(), "Aadhaar".into()],
            Vec::new(),
            Utc::now(),
        );
        assert_eq!(rec.attached_count(), 1);
    }
}
