use hashbrown::HashMap;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PORT: u16 = 16004;

/// Simulator configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    /// Expected originator address at session bind.
    pub user: String,
    /// Expected password at session bind, compared after hex decoding.
    pub password: String,
    /// Used as the recipient address in synthesized delivery notifications.
    pub access_code: String,
    /// TCP listen port for the UCP protocol.
    pub port: u16,
    /// Delay between a submit ack and its delivery notification.
    pub dn_delay_ms: u64,
    /// Billing identifier to currency-units cost.
    pub tariff: HashMap<String, f64>,
}

impl Default for Config {
    fn default() -> Config {
        let mut tariff = HashMap::new();
        tariff.insert("01000001C1230001F0".to_string(), 1.0);
        tariff.insert("01000001C123000250".to_string(), 2.0);
        tariff.insert("01000001C123000210".to_string(), 2.5);
        tariff.insert("01000001C123000220".to_string(), 5.0);
        tariff.insert("01000001C123000230".to_string(), 10.0);
        tariff.insert("01000001C123000240".to_string(), 15.0);

        Config {
            user: "emi_client".to_string(),
            password: "password".to_string(),
            access_code: "2929".to_string(),
            port: DEFAULT_PORT,
            dn_delay_ms: 2000,
            tariff,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Config {
        serdeconv::from_toml_file(path).expect("Error loading simulator configuration file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.user, "emi_client");
        assert_eq!(config.password, "password");
        assert_eq!(config.access_code, "2929");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.dn_delay_ms, 2000);
        assert_eq!(config.tariff.get("01000001C123000210"), Some(&2.5));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let toml = serdeconv::to_toml_string(&config).unwrap();
        let back: Config = serdeconv::from_toml_str(&toml).unwrap();
        assert_eq!(back.user, config.user);
        assert_eq!(back.port, config.port);
        assert_eq!(back.tariff.len(), config.tariff.len());
    }
}
