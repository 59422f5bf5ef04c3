//! Server configuration from the environment.
//! HOST (default 0.0.0.0), PORT (8080), DATA_DIR (data), INACTIVITY_HOURS (12).

use crate::models::TournamentId;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// One `<id>.json` per tournament lives here.
    pub data_dir: PathBuf,
    /// Tournaments idle this long are dropped from memory (their files stay).
    pub inactivity_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            inactivity_timeout: Duration::from_secs(12 * 3600),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys keep their default; unparseable ones are logged and
    /// ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let hours = parsed(&lookup, "INACTIVITY_HOURS").and_then(|h: u64| match h.checked_mul(3600) {
            Some(secs) => Some(Duration::from_secs(secs)),
            None => {
                log::warn!("Ignoring INACTIVITY_HOURS={}: too large", h);
                None
            }
        });
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            inactivity_timeout: hours.unwrap_or(defaults.inactivity_timeout),
        }
    }

    pub fn tournament_path(&self, id: TournamentId) -> PathBuf {
        self.data_dir.join(format!("{}.json", id))
    }
}

fn parsed<T: FromStr, F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(ServerConfig::from_lookup(lookup(&[])), ServerConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("DATA_DIR", "/tmp/padel"),
            ("INACTIVITY_HOURS", "2"),
        ]));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/padel"));
        assert_eq!(config.inactivity_timeout, Duration::from_secs(7200));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "eighty"), ("INACTIVITY_HOURS", "-1")]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.inactivity_timeout, Duration::from_secs(12 * 3600));
    }

    #[test]
    fn oversized_timeout_falls_back() {
        let hours = u64::MAX.to_string();
        let config = ServerConfig::from_lookup(lookup(&[("INACTIVITY_HOURS", hours.as_str())]));
        assert_eq!(config.inactivity_timeout, Duration::from_secs(12 * 3600));
    }

    #[test]
    fn one_file_per_tournament() {
        let config = ServerConfig::default();
        let id = uuid::Uuid::nil();
        assert_eq!(
            config.tournament_path(id),
            PathBuf::from("data/00000000-0000-0000-0000-000000000000.json")
        );
    }
}
