use serde::{Deserialize, Serialize};

use crate::app::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSuccess {
    pub url: String,
    pub catalog_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub url: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of importing one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ImportResult {
    Success(ImportSuccess),
    Failure(ImportFailure),
}

impl ImportResult {
    pub fn url(&self) -> &str {
        match self {
            ImportResult::Success(s) => &s.url,
            ImportResult::Failure(f) => &f.url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImportResult::Success(_))
    }
}

/// Aggregated outcome of a batch import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub successes: Vec<ImportSuccess>,
    pub failures: Vec<ImportFailure>,
    pub total: usize,
}

impl BatchReport {
    pub fn record(&mut self, result: ImportResult) {
        match result {
            ImportResult::Success(s) => self.successes.push(s),
            ImportResult::Failure(f) => self.failures.push(f),
        }
    }

    pub fn processed(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_splits_outcomes() {
        let mut report = BatchReport {
            total: 2,
            ..Default::default()
        };
        report.record(ImportResult::Success(ImportSuccess {
            url: "https://example.com/product/a".into(),
            catalog_id: 1,
            title: "A".into(),
        }));
        report.record(ImportResult::Failure(ImportFailure {
            url: "https://example.com/product/b".into(),
            kind: ErrorKind::Fetch,
            message: "timed out".into(),
        }));

        assert_eq!(report.successes.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.processed(), 2);
    }

    #[test]
    fn test_import_result_is_tagged_in_json() {
        let result = ImportResult::Failure(ImportFailure {
            url: "https://example.com/product/b".into(),
            kind: ErrorKind::InvalidData,
            message: "Product title is required".into(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["kind"], "invalid_data");
        assert_eq!(result.url(), "https://example.com/product/b");
        assert!(!result.is_success());
    }
}
