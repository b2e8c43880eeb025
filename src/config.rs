use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::codec;
use crate::types::MotionSpec;

/// Patrón que el daemon vigila, con un nombre para los mensajes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchSpec {
    pub name: String,
    #[serde(flatten)]
    pub spec: MotionSpec,
}

impl WatchSpec {
    pub fn new(name: &str, dlt_x: u32, dlt_y: u32, dlt_z: u32, freq: u32) -> Self {
        Self {
            name: name.to_string(),
            spec: MotionSpec::new(dlt_x, dlt_y, dlt_z, freq),
        }
    }

    pub fn motion(&self) -> MotionSpec {
        self.spec
    }
}

/// Configuración del daemon
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Patrones a registrar al arrancar
    pub events: Vec<WatchSpec>,
    /// Pausa entre muestras enviadas al motor (default: 10)
    pub sample_interval_ms: u64,
    /// Segundos antes de destruir todos los eventos (default: 60)
    pub terminate_delay_secs: u64,
    /// uid con el que se publica la referencia (default: 0)
    pub caller_uid: u32,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            events: default_watch_specs(),
            sample_interval_ms: 10,
            terminate_delay_secs: 60,
            caller_uid: 0,
        }
    }
}

/// Los tres patrones clásicos: sacudida horizontal, vertical y combinada
pub fn default_watch_specs() -> Vec<WatchSpec> {
    vec![
        WatchSpec::new("horizontal shake", 400, 0, 0, 4),
        WatchSpec::new("vertical shake", 0, 400, 0, 4),
        WatchSpec::new("shake", 400, 400, 0, 4),
    ]
}

impl DaemonConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("No se pudo leer la configuración {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Configuración inválida en {:?}", path))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: DaemonConfig = serde_json::from_str(content)?;
        ensure!(!config.events.is_empty(), "No hay eventos configurados");
        Ok(config)
    }

    /// Sustituye los eventos por los patrones de un fichero de registros de
    /// 16 bytes (dlt_x, dlt_y, dlt_z, freq little-endian)
    pub fn load_raw_events(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("No se pudo leer {:?}", path))?;
        let specs = codec::decode_specs(&bytes)
            .with_context(|| format!("Fichero de patrones corrupto {:?}", path))?;
        ensure!(!specs.is_empty(), "El fichero {:?} no contiene patrones", path);
        self.events = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| WatchSpec {
                name: format!("patrón {}", i + 1),
                spec,
            })
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.events.len(), 3);
        assert_eq!(config.events[2].motion(), MotionSpec::new(400, 400, 0, 4));
        assert_eq!(config.terminate_delay_secs, 60);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DaemonConfig::from_json(r#"{ "sample_interval_ms": 2 }"#).unwrap();
        assert_eq!(config.sample_interval_ms, 2);
        assert_eq!(config.events, default_watch_specs());
    }

    #[test]
    fn test_custom_events() {
        let json = r#"{
            "events": [{ "name": "golpe", "dlt_x": 0, "dlt_y": 0, "dlt_z": 900, "freq": 1 }],
            "terminate_delay_secs": 5
        }"#;
        let config = DaemonConfig::from_json(json).unwrap();
        assert_eq!(config.events[0].name, "golpe");
        assert_eq!(config.events[0].motion().dlt_z, 900);
    }

    #[test]
    fn test_empty_events_rejected() {
        assert!(DaemonConfig::from_json(r#"{ "events": [] }"#).is_err());
    }

    #[test]
    fn test_raw_events_replace_configured() {
        let path = std::env::temp_dir().join(format!("temblor_{}_specs.bin", std::process::id()));
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&codec::encode_spec(&MotionSpec::new(0, 0, 900, 1)));
        bytes.extend_from_slice(&codec::encode_spec(&MotionSpec::new(300, 300, 0, 50)));
        fs::write(&path, &bytes).unwrap();

        let mut config = DaemonConfig::default();
        config.load_raw_events(&path).unwrap();
        assert_eq!(config.events.len(), 2);
        assert_eq!(config.events[0].name, "patrón 1");
        // freq se limita al crear el evento, no al leer
        assert_eq!(config.events[1].motion().freq, 50);

        fs::write(&path, &bytes[..20]).unwrap();
        assert!(config.load_raw_events(&path).is_err());
        let _ = fs::remove_file(path);
    }
}
