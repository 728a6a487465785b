//! Verification options.
//!
//! The serialized form is what `conform.json` holds; missing keys fall back
//! to the defaults below. Reading the file is left to the caller.

use serde::{Deserialize, Serialize};

/// Knobs for a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// Compare parameter and return annotations
    #[serde(default = "default_true")]
    pub check_annotations: bool,
    /// Memoize outcomes per (contract, candidate) pair
    #[serde(default = "default_true")]
    pub cache: bool,
}

fn default_true() -> bool {
    true
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            check_annotations: true,
            cache: true,
        }
    }
}

impl VerifyOptions {
    pub fn without_annotations(mut self) -> Self {
        self.check_annotations = false;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = VerifyOptions::default();
        assert!(options.check_annotations);
        assert!(options.cache);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: VerifyOptions = serde_json::from_str(r#"{"check_annotations": false}"#).unwrap();
        assert!(!options.check_annotations);
        assert!(options.cache);

        let empty: VerifyOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, VerifyOptions::default());
    }

    #[test]
    fn test_builders() {
        let options = VerifyOptions::default().without_annotations().without_cache();
        assert!(!options.check_annotations);
        assert!(!options.cache);
    }
}
