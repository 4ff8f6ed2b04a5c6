// ── Configuration schema ──
//
// Fields the host renders in its module settings page. Validation of
// the `host` input happens host-side, driven by `regex`.

use serde::{Deserialize, Serialize};

pub const HOST_FIELD: &str = "host";

/// Dotted-quad IPv4 pattern in the host's `/.../` regex notation.
pub const REGEX_IP: &str = "/^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$/";

const INFO_TEXT: &str = "This module controls an iTach IP2CC device by Global Caché \
    (https://www.globalcache.com/products/itach/ip2ccspecs/).";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConfigField {
    /// Editable single-line input.
    #[serde(rename = "textinput")]
    TextInput {
        id: String,
        label: String,
        width: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regex: Option<String>,
    },
    /// Read-only informational text.
    #[serde(rename = "text")]
    StaticText {
        id: String,
        label: String,
        width: u8,
        value: String,
    },
}

impl ConfigField {
    pub fn id(&self) -> &str {
        match self {
            Self::TextInput { id, .. } | Self::StaticText { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::TextInput { label, .. } | Self::StaticText { label, .. } => label,
        }
    }
}

pub fn config_fields() -> Vec<ConfigField> {
    vec![
        ConfigField::TextInput {
            id: HOST_FIELD.into(),
            label: "Device IP".into(),
            width: 12,
            regex: Some(REGEX_IP.into()),
        },
        ConfigField::StaticText {
            id: "info".into(),
            label: "Information".into(),
            width: 12,
            value: INFO_TEXT.into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn host_field_then_info() {
        let fields = config_fields();
        let ids: Vec<&str> = fields.iter().map(ConfigField::id).collect();
        assert_eq!(ids, vec!["host", "info"]);
        assert_eq!(fields[0].label(), "Device IP");
    }

    #[test]
    fn serializes_with_type_tag() {
        let value = serde_json::to_value(&config_fields()[0]).unwrap();
        assert_eq!(value["type"], "textinput");
        assert_eq!(value["id"], "host");
        assert_eq!(value["regex"], REGEX_IP);

        let info = serde_json::to_value(&config_fields()[1]).unwrap();
        assert_eq!(info["type"], "text");
        assert!(info["value"].as_str().unwrap().contains("IP2CC"));
    }
}
