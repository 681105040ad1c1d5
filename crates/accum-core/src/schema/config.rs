use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::MAX_TREE_DEPTH;

/// Configuration for an accumulator tree.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct TreeConfiguration {
    /// Number of levels between a leaf and the root.
    pub depth: u8,
    /// Compression function used to combine children.
    #[serde(default)]
    pub hash: HashFunction,
}

/// Compression function selection.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    /// Sapling level-personalized Pedersen hash.
    #[default]
    Pedersen,
    /// SHA-256 over the concatenated children.
    Sha256,
}

impl TreeConfiguration {
    /// Create a new tree configuration.
    #[must_use]
    pub const fn new(depth: u8, hash: HashFunction) -> Self {
        Self { depth, hash }
    }

    /// Check that the depth is supported.
    ///
    /// # Errors
    /// Returns [`TreeError::ZeroDepth`] for a depth of zero and
    /// [`TreeError::DepthTooLarge`] if `depth` exceeds [`MAX_TREE_DEPTH`].
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.depth == 0 {
            return Err(TreeError::ZeroDepth);
        }
        if self.depth > MAX_TREE_DEPTH {
            return Err(TreeError::DepthTooLarge {
                depth: usize::from(self.depth),
                max: MAX_TREE_DEPTH,
            });
        }
        Ok(())
    }

    /// Number of leaves a tree with this depth holds.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        1u64.checked_shl(u32::from(self.depth))
            .unwrap_or(u64::MAX)
    }
}

impl HashFunction {
    /// Parse from a lowercase name.
    #[must_use]
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "pedersen" => Some(Self::Pedersen),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }
}

/// JSON schema describing [`TreeConfiguration`].
#[must_use]
pub fn configuration_schema() -> Schema {
    schemars::schema_for!(TreeConfiguration)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "unit-test")]

    use super::*;

    #[test]
    fn hash_defaults_to_pedersen() {
        let config: TreeConfiguration = serde_json::from_str(r#"{"depth": 4}"#).unwrap();
        assert_eq!(config, TreeConfiguration::new(4, HashFunction::Pedersen));
        assert_eq!(config.capacity(), 16);
    }

    #[test]
    fn hash_is_lowercase_in_json() {
        let config = TreeConfiguration::new(2, HashFunction::Sha256);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"depth":2,"hash":"sha256"}"#);
        assert_eq!(serde_json::from_str::<TreeConfiguration>(&json).unwrap(), config);
        assert_eq!(HashFunction::from_str_name("sha256"), Some(HashFunction::Sha256));
        assert_eq!(HashFunction::from_str_name("blake2"), None);
    }

    #[test]
    fn validate_rejects_unsupported_depths() {
        assert!(TreeConfiguration::new(32, HashFunction::Pedersen).validate().is_ok());
        assert_eq!(
            TreeConfiguration::new(0, HashFunction::Pedersen).validate(),
            Err(TreeError::ZeroDepth)
        );
        assert_eq!(
            TreeConfiguration::new(33, HashFunction::Pedersen).validate(),
            Err(TreeError::DepthTooLarge { depth: 33, max: 32 })
        );
    }

    #[test]
    fn schema_names_both_fields() {
        let schema = serde_json::to_value(configuration_schema()).unwrap();
        let properties = schema.get("properties").unwrap();
        assert!(properties.get("depth").is_some());
        assert!(properties.get("hash").is_some());
    }
}
