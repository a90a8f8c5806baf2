use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::output::DEFAULT_BAUD_RATE;
use crate::sign::{Sign, SignRegistry};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub serial: SerialConfig,
    #[serde(default)]
    pub signs: Vec<SignConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignConfig {
    pub name: String,
    /// Bus address set on the sign's rotary switch (1-15)
    pub address: u8,
    pub width: usize,
    pub height: usize,
    /// Sign is mounted upside-down
    #[serde(default)]
    pub flip: bool,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

impl SignConfig {
    pub fn to_sign(&self) -> Result<Sign> {
        Sign::with_flip(&self.name, self.address, self.width, self.height, self.flip)
    }
}

impl Config {
    /// Validate every configured sign and register them in file order
    pub fn build_registry(&self) -> Result<SignRegistry> {
        let mut registry = SignRegistry::new();
        for sign in &self.signs {
            registry.register(sign.to_sign()?);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "serial": { "port": "/dev/ttyUSB0" },
            "signs": [
                { "name": "front", "address": 1, "width": 86, "height": 7 },
                { "name": "rear", "address": 2, "width": 56, "height": 16, "flip": true }
            ]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.serial.baud_rate, 4800);

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("rear").unwrap().flip());
        assert!(!registry.get("front").unwrap().flip());
    }

    #[test]
    fn test_invalid_sign_rejected() {
        let json = r#"{
            "serial": { "port": "/dev/ttyUSB0", "baud_rate": 9600 },
            "signs": [ { "name": "bad", "address": 0, "width": 86, "height": 7 } ]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.serial.baud_rate, 9600);
        assert!(matches!(
            config.build_registry(),
            Err(Error::Configuration { sign, .. }) if sign == "bad"
        ));
    }
}
