//! INI file configuration adapter.

use crate::domain::error::{AnalyticsError, Result};
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AnalyticsError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        log::debug!("loaded config from {}", path.display());
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AnalyticsError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
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
[indicators]
rsi_period = 21
bollinger_num_std = 1.5

[risk]
return_kind = log

[optimizer]
allow_short = on
"#;

    #[test]
    fn reads_typed_values() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("indicators", "rsi_period", 14), 21);
        assert_eq!(adapter.get_double("indicators", "bollinger_num_std", 2.0), 1.5);
        assert_eq!(adapter.get_string("risk", "return_kind"), Some("log".to_string()));
        assert!(adapter.get_bool("optimizer", "allow_short", false));
    }

    #[test]
    fn missing_values_fall_back() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("risk", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_int("indicators", "sma_period", 20), 20);
        assert_eq!(adapter.get_double("risk", "var_confidence", 0.95), 0.95);
        assert!(!adapter.get_bool("optimizer", "missing", false));
    }

    #[test]
    fn unparsable_values_fall_back() {
        let adapter = FileConfigAdapter::from_string(
            "[indicators]\nsma_period = abc\nbollinger_num_std = wide\n[optimizer]\nallow_short = maybe\n",
        )
        .unwrap();
        assert_eq!(adapter.get_int("indicators", "sma_period", 20), 20);
        assert_eq!(adapter.get_double("indicators", "bollinger_num_std", 2.0), 2.0);
        assert!(adapter.get_bool("optimizer", "allow_short", true));
    }

    #[test]
    fn bool_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[o]\na = yes\nb = 1\nc = off\nd = FALSE\n").unwrap();
        assert!(adapter.get_bool("o", "a", false));
        assert!(adapter.get_bool("o", "b", false));
        assert!(!adapter.get_bool("o", "c", true));
        assert!(!adapter.get_bool("o", "d", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[alignment]\npolicy = union\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("alignment", "policy"),
            Some("union".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/quantkit.ini").unwrap_err();
        assert!(matches!(err, AnalyticsError::ConfigParse { .. }));
    }
}
