use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback bucket for questions without an explicit subject tag.
pub const DEFAULT_SUBJECT: &str = "General";

/// Subject tag used for per-subject score breakdowns.
///
/// Question authors tag questions free-form ("Physics", "Math", ...); blank
/// or whitespace-only tags normalize to [`DEFAULT_SUBJECT`]. Ordered so that
/// subject-wise rollups iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subject(String);

impl Subject {
    /// Normalizes a raw subject tag, mapping blank input to the default.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::general()
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// The default subject bucket.
    #[must_use]
    pub fn general() -> Self {
        Self(DEFAULT_SUBJECT.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self::general()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Subject {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_subject_normalizes_to_general() {
        assert_eq!(Subject::normalize(""), Subject::general());
        assert_eq!(Subject::normalize("   "), Subject::general());
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(Subject::normalize("  Physics "), Subject::from("Physics"));
    }

    #[test]
    fn default_is_general() {
        assert_eq!(Subject::default().as_str(), DEFAULT_SUBJECT);
    }
}
