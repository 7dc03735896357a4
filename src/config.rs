//! Configuration for the SOC pipeline
//!
//! The heuristic data the stages consume — the detector's event allow-list,
//! the threat context table, the responder's incident threshold — is
//! configuration, not code, so deployments can swap it without touching the
//! pipeline logic. Every section carries built-in defaults; a missing file
//! or section falls back to them.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SocConfig {
    pub detector: DetectorSection,
    pub intel: IntelSection,
    pub responder: ResponderSection,
}

/// Detection stage section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorSection {
    /// Recognized raw event descriptions. Validation is exact string match.
    pub known_events: Vec<String>,
}

impl Default for DetectorSection {
    fn default() -> Self {
        Self {
            known_events: vec![
                "Intento de login fallido desde IP 192.168.1.100".to_string(),
                "Tráfico sospechoso en puerto 4444".to_string(),
                "Múltiples conexiones desde IP desconocida 10.0.0.50".to_string(),
                "Escaneo de puertos detectado desde 172.16.0.20".to_string(),
                "Actividad anómala en servicio SSH".to_string(),
            ],
        }
    }
}

/// Threat intelligence section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntelSection {
    /// Pattern name -> context string (origin, actor group, severity).
    pub contexts: HashMap<String, String>,
}

impl Default for IntelSection {
    fn default() -> Self {
        let mut contexts = HashMap::new();
        contexts.insert(
            "ATAQUE_RECONOCIMIENTO".to_string(),
            "ORIGEN:China|GRUPO:APT28|SEVERIDAD:MEDIA".to_string(),
        );
        contexts.insert(
            "ATAQUE_FUERZA_BRUTA".to_string(),
            "ORIGEN:Rusia|GRUPO:FancyBear|SEVERIDAD:ALTA".to_string(),
        );
        contexts.insert(
            "POSIBLE_DDOS".to_string(),
            "ORIGEN:Botnet|GRUPO:Mirai|SEVERIDAD:CRITICA".to_string(),
        );
        Self { contexts }
    }
}

/// Response orchestration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResponderSection {
    /// Handled-incident count after which the orchestrator terminates.
    pub incident_threshold: u32,
}

impl Default for ResponderSection {
    fn default() -> Self {
        Self {
            incident_threshold: 3,
        }
    }
}

impl SocConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: SocConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.responder.incident_threshold == 0 {
            return Err(ConfigError::Invalid(
                "responder.incident_threshold must be at least 1".to_string(),
            ));
        }
        if self.detector.known_events.is_empty() {
            return Err(ConfigError::Invalid(
                "detector.known_events must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_seed_full_data_set() {
        let config = SocConfig::default();

        assert_eq!(config.detector.known_events.len(), 5);
        assert!(config
            .detector
            .known_events
            .contains(&"Escaneo de puertos detectado desde 172.16.0.20".to_string()));
        assert_eq!(
            config.intel.contexts.get("ATAQUE_FUERZA_BRUTA").unwrap(),
            "ORIGEN:Rusia|GRUPO:FancyBear|SEVERIDAD:ALTA"
        );
        assert_eq!(config.responder.incident_threshold, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SocConfig = toml::from_str(
            r#"
            [responder]
            incident_threshold = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.responder.incident_threshold, 5);
        assert_eq!(config.detector.known_events.len(), 5);
        assert_eq!(config.intel.contexts.len(), 3);
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let config: SocConfig = toml::from_str(
            r#"
            [responder]
            incident_threshold = 0
            "#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_allow_list_is_rejected() {
        let config: SocConfig = toml::from_str(
            r#"
            [detector]
            known_events = []
            "#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_round_trip() {
        let config = SocConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: SocConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}
