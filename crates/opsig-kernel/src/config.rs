//! Derivation configuration.
//!
//! Loaded from TOML. Every section is optional; missing keys fall back to
//! the defaults below.
//!
//! ```toml
//! [types]
//! Generator = "Generator"
//!
//! [resource_options]
//! type_name = "ResourceOptions"
//! name = "options"
//! default = "{}"
//!
//! [receiver]
//! expr = "*this"
//! ```

use crate::error::OpsigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeriveConfig {
    /// Extra base-type renderings, merged over the built-in table.
    pub types: BTreeMap<String, String>,

    pub resource_options: ResourceOptionsConfig,

    pub receiver: ReceiverConfig,
}

/// How the grouped resource-options parameter appears on the front surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceOptionsConfig {
    pub type_name: String,
    pub name: String,
    /// Default used when all four constituents are defaulted.
    pub default: String,
}

impl Default for ResourceOptionsConfig {
    fn default() -> Self {
        Self {
            type_name: "ResourceOptions".to_string(),
            name: "options".to_string(),
            default: "{}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiverConfig {
    /// Expression naming the implicit receiver inside a front-surface method.
    pub expr: String,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            expr: "*this".to_string(),
        }
    }
}

impl DeriveConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, OpsigError> {
        toml::from_str(text).map_err(|e| OpsigError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            DeriveConfig::from_toml_str("").unwrap(),
            DeriveConfig::default()
        );
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = DeriveConfig::from_toml_str(
            r#"
            [types]
            Generator = "GeneratorRef"

            [resource_options]
            name = "opts"
            "#,
        )
        .unwrap();
        assert_eq!(config.types["Generator"], "GeneratorRef");
        assert_eq!(config.resource_options.name, "opts");
        assert_eq!(config.resource_options.type_name, "ResourceOptions");
        assert_eq!(config.receiver.expr, "*this");
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = DeriveConfig::from_toml_str("[receiver]\nname = \"self\"\n").unwrap_err();
        assert!(matches!(err, OpsigError::InvalidConfig(_)));
    }
}
