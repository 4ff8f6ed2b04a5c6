use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Link health as understood by the control-surface host.
///
/// The host renders these four levels directly, so the set is fixed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    #[default]
    Unknown,
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn renders_lowercase() {
        assert_eq!(Status::Ok.to_string(), "ok");
        assert_eq!(Status::Warning.to_string(), "warning");
        assert_eq!(Status::from_str("error").ok(), Some(Status::Error));
    }

    #[test]
    fn defaults_to_unknown() {
        assert_eq!(Status::default(), Status::Unknown);
    }
}
