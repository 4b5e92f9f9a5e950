//! Batch outcomes.

use crate::error::Error;
use crate::failure::{error_chain_message, FailureKind};
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::time::Duration;

/// Outcome of one request in a batch.
///
/// `code` is the HTTP status on success, or [`FailureKind::code`] on failure
/// (which is the status itself for 4xx/5xx). `content` is the response body or
/// the error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub code: i32,
    pub content: String,
}

impl BatchEntry {
    pub fn success(status: u16, body: impl Into<String>) -> Self {
        Self {
            code: i32::from(status),
            content: body.into(),
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            code: kind.code(),
            content: message.into(),
        }
    }

    pub fn from_error(err: &Error) -> Self {
        let message = match err {
            Error::Transport { source, .. } => error_chain_message(source),
            other => other.to_string(),
        };
        Self::failure(err.failure_kind(), message)
    }

    /// Statuses below 400 are successes; 4xx/5xx and negative codes are not.
    pub fn is_success(&self) -> bool {
        (100..400).contains(&self.code)
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        if self.is_success() {
            None
        } else {
            Some(FailureKind::from_code(self.code))
        }
    }
}

/// Index-aligned outcomes of a batch: `entries[i]` belongs to `params_list[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchResult {
    entries: Vec<BatchEntry>,
    #[serde(skip)]
    pub execution_time: Duration,
}

impl BatchResult {
    pub fn new(entries: Vec<BatchEntry>, execution_time: Duration) -> Self {
        Self {
            entries,
            execution_time,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BatchEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.entries
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(BatchEntry::is_success)
    }

    pub fn success_rate(&self) -> f64 {
        if self.entries.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.len() as f64
        }
    }
}

impl Index<usize> for BatchResult {
    type Output = BatchEntry;

    fn index(&self, index: usize) -> &BatchEntry {
        &self.entries[index]
    }
}

impl IntoIterator for BatchResult {
    type Item = BatchEntry;
    type IntoIter = std::vec::IntoIter<BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a BatchEntry;
    type IntoIter = std::slice::Iter<'a, BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchResult {
        BatchResult::new(
            vec![
                BatchEntry::success(200, "a"),
                BatchEntry::failure(FailureKind::Timeout, "timed out"),
                BatchEntry::success(204, ""),
                BatchEntry::failure(FailureKind::Status(404), "Client error"),
            ],
            Duration::from_millis(5),
        )
    }

    #[test]
    fn test_counts() {
        let result = sample();
        assert_eq!(result.len(), 4);
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 2);
        assert!(!result.all_succeeded());
        assert!((result.success_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_result() {
        let result = BatchResult::default();
        assert!(result.is_empty());
        assert!(result.all_succeeded());
        assert_eq!(result.success_rate(), 0.0);
    }

    #[test]
    fn test_entry_failure_kind() {
        let result = sample();
        assert_eq!(result[0].failure_kind(), None);
        assert_eq!(result[1].failure_kind(), Some(FailureKind::Timeout));
        assert_eq!(result[3].failure_kind(), Some(FailureKind::Status(404)));
    }

    #[test]
    fn test_entry_from_status_error() {
        let err = Error::Status {
            status: 500,
            message: "Server error: boom".into(),
        };
        assert_eq!(
            BatchEntry::from_error(&err),
            BatchEntry {
                code: 500,
                content: "Server error: boom".into()
            }
        );
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json[0], serde_json::json!({"code": 200, "content": "a"}));
        assert_eq!(json[1]["code"], -1);
        assert_eq!(json.as_array().unwrap().len(), 4);
    }
}
