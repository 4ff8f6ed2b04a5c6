// ── Adapter configuration ──
//
// What the host hands the adapter on every configuration update. The
// adapter replaces it wholesale; it never reads config files itself.

use serde::{Deserialize, Serialize};

use ip2cc_api::DEFAULT_PORT;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Device address. Empty means "no device configured".
    #[serde(default)]
    pub host: String,

    /// Command port. Not part of the host schema; the unit always
    /// listens on 4998, but tunnels and test rigs may differ.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
        }
    }
}

impl AdapterConfig {
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// The configured host, or `None` when blank.
    pub fn host(&self) -> Option<&str> {
        let host = self.host.trim();
        (!host.is_empty()).then_some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_host_means_unset() {
        assert_eq!(AdapterConfig::default().host(), None);
        assert_eq!(AdapterConfig::with_host("   ").host(), None);
        assert_eq!(AdapterConfig::with_host(" 10.0.0.5 ").host(), Some("10.0.0.5"));
    }

    #[test]
    fn port_defaults_to_4998() {
        assert_eq!(AdapterConfig::with_host("10.0.0.5").port, 4998);
        let parsed: AdapterConfig = serde_json::from_str(r#"{"host":"10.0.0.5"}"#).unwrap_or_default();
        assert_eq!(parsed.port, 4998);
        assert_eq!(parsed.host, "10.0.0.5");
    }
}
