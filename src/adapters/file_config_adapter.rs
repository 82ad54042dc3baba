//! INI file configuration adapter.
//!
//! Keys and section names are case-sensitive, `#` is the only comment
//! symbol (scripts may contain `;`), and indented continuation lines are
//! joined into the previous value.

use crate::domain::error::TickwatchError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    fn ini() -> Ini {
        let mut config = Ini::new_cs();
        config.set_comment_symbols(&['#']);
        config.set_multiline(true);
        config
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TickwatchError> {
        let path = path.as_ref();
        let mut config = Self::ini();
        config
            .load(path)
            .map_err(|reason| TickwatchError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TickwatchError> {
        let mut config = Self::ini();
        config
            .read(content.to_string())
            .map_err(|reason| TickwatchError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
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
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}
