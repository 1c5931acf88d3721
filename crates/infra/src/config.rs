//! Store configuration loaded from the environment.

use std::env;

/// Environment variable that turns demo seeding on or off.
pub const SEED_ENV: &str = "STOCKROOM_SEED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Start with the demo vendors, parts, shipments and BOMs loaded.
    pub seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

impl StoreConfig {
    /// Read `STOCKROOM_SEED` (default: on).
    ///
    /// Unrecognized values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let seed = match env::var(SEED_ENV) {
            Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
                tracing::warn!("{SEED_ENV}='{raw}' is not a boolean; seeding demo data");
                true
            }),
            Err(_) => true,
        };
        Self { seed }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
