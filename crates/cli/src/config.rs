//! Optional `ocpi.toml` settings for the `ocpi` command.
//!
//! # Example
//!
//! ```toml
//! # The party this tool acts for. Used as the out-of-band identity when an
//! # entity body leaves country_code or party_id out.
//! [party]
//! country_code = "NL"
//! party_id = "TNM"
//!
//! [log]
//! level = "info"
//! ```
//!
//! Command-line flags always win over the file.

use std::path::Path;

use ocpi_contract::IdentityFragment;
use serde::Deserialize;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ocpi.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OcpiConfig {
    #[serde(default)]
    pub party: PartyConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// `[party]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartyConfig {
    pub country_code: Option<String>,
    pub party_id: Option<String>,
}

/// `[log]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// An `EnvFilter` directive such as `warn` or `ocpi_contract=debug`.
    pub level: Option<String>,
}

pub fn read_config(path: &Path) -> Result<OcpiConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Load the explicitly requested file, or `ocpi.toml` if one happens to be
/// present, or fall back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<OcpiConfig, String> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_config(default)
            } else {
                Ok(OcpiConfig::default())
            }
        }
    }
}

impl PartyConfig {
    /// The configured party as an out-of-band identity fragment.
    pub fn fragment(&self) -> Result<IdentityFragment, String> {
        let mut fragment = IdentityFragment::new();
        if let Some(code) = &self.country_code {
            let code = code
                .parse()
                .map_err(|e| format!("invalid [party] country_code: {}", e))?;
            fragment = fragment.with_country_code(code);
        }
        if let Some(id) = &self.party_id {
            let id = id
                .parse()
                .map_err(|e| format!("invalid [party] party_id: {}", e))?;
            fragment = fragment.with_party_id(id);
        }
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: OcpiConfig = toml::from_str(
            r#"
            [party]
            country_code = "NL"
            party_id = "TNM"

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.party.country_code.as_deref(), Some("NL"));
        assert_eq!(config.log.level.as_deref(), Some("debug"));

        let fragment = config.party.fragment().unwrap();
        assert_eq!(fragment.country_code.unwrap().as_str(), "NL");
        assert_eq!(fragment.party_id.unwrap().as_str(), "TNM");
        assert_eq!(fragment.id, None);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config: OcpiConfig = toml::from_str("").unwrap();
        assert_eq!(config, OcpiConfig::default());
        assert!(config.party.fragment().unwrap().is_empty());
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(toml::from_str::<OcpiConfig>("[server]\nport = 1").is_err());
    }

    #[test]
    fn bad_party_codes_are_reported() {
        let party = PartyConfig {
            country_code: Some("nld".to_string()),
            party_id: None,
        };
        let err = party.fragment().unwrap_err();
        assert!(err.starts_with("invalid [party] country_code"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/ocpi.toml"))).unwrap_err();
        assert!(err.contains("could not read"));
    }
}
