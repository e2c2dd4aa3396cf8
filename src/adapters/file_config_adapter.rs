//! INI file configuration adapter.
//!
//! Values can be overridden from the environment: `BLOTTER_WEB_LISTEN`
//! replaces `[web] listen`. Overrides are captured once, when
//! [`FileConfigAdapter::with_env_overrides`] is called.

use crate::domain::error::BlotterError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::collections::HashMap;
use std::path::Path;

pub const ENV_PREFIX: &str = "BLOTTER_";

pub struct FileConfigAdapter {
    config: Ini,
    overrides: HashMap<String, String>,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BlotterError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| BlotterError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            overrides: HashMap::new(),
        })
    }

    pub fn from_string(content: &str) -> Result<Self, BlotterError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| BlotterError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self {
            config,
            overrides: HashMap::new(),
        })
    }

    /// Layer `BLOTTER_*` variables from the process environment on top.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::vars())
    }

    /// Layer `BLOTTER_<SECTION>_<KEY>` pairs on top of the file values.
    pub fn with_overrides<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.overrides.extend(
            vars.into_iter()
                .filter(|(name, _)| name.starts_with(ENV_PREFIX)),
        );
        self
    }

    fn override_key(section: &str, key: &str) -> String {
        format!("{ENV_PREFIX}{section}_{key}").to_uppercase()
    }

    fn lookup(&self, section: &str, key: &str) -> Option<String> {
        self.overrides
            .get(&Self::override_key(section, key))
            .cloned()
            .or_else(|| self.config.get(section, key))
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.lookup(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.lookup(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.lookup(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[store]
backend = sqlite

[sqlite]
path = /var/lib/blotter/trades.db
pool_size = 8

[web]
listen = 0.0.0.0:8080

[log]
level = debug
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("store", "backend"), Some("sqlite".into()));
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("/var/lib/blotter/trades.db".into())
        );
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 8);
        assert_eq!(adapter.get_string("web", "listen"), Some("0.0.0.0:8080".into()));
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string("[sqlite]\npool_size = many\n").unwrap();
        assert_eq!(adapter.get_string("sqlite", "path"), None);
        assert_eq!(adapter.get_string("nope", "path"), None);
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 4);
        assert!(adapter.get_bool("web", "enabled", true));
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[web]\na = yes\nb = 0\nc = TRUE\nd = maybe\n").unwrap();
        assert!(adapter.get_bool("web", "a", false));
        assert!(!adapter.get_bool("web", "b", true));
        assert!(adapter.get_bool("web", "c", false));
        assert!(!adapter.get_bool("web", "d", false));
    }

    #[test]
    fn overrides_take_precedence_over_file() {
        let adapter = FileConfigAdapter::from_string(SAMPLE)
            .unwrap()
            .with_overrides(env(&[
                ("BLOTTER_WEB_LISTEN", "127.0.0.1:9999"),
                ("BLOTTER_SQLITE_POOL_SIZE", "2"),
                ("HOME", "/root"),
            ]));
        assert_eq!(adapter.get_string("web", "listen"), Some("127.0.0.1:9999".into()));
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 2);
        assert_eq!(adapter.get_string("log", "level"), Some("debug".into()));
    }

    #[test]
    fn override_can_supply_missing_key() {
        let adapter = FileConfigAdapter::from_string("[store]\n")
            .unwrap()
            .with_overrides(env(&[("BLOTTER_POSTGRES_CONNECTION_STRING", "host=db")]));
        assert_eq!(
            adapter.get_string("postgres", "connection_string"),
            Some("host=db".into())
        );
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("log", "level"), Some("debug".into()));
    }

    #[test]
    fn from_file_reports_missing_file() {
        match FileConfigAdapter::from_file("/nonexistent/path/blotter.ini") {
            Err(BlotterError::ConfigParse { file, .. }) => {
                assert_eq!(file, "/nonexistent/path/blotter.ini")
            }
            Err(other) => panic!("expected ConfigParse, got {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }
}
