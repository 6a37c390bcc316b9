//! Runtime configuration read from the environment.
//!
//! `main` loads an optional `.env` with `dotenvy` before calling
//! [`AppConfig::from_env`]. Unparseable values fall back to the default and
//! are reported on the log stream.

use serde::Serialize;
use std::path::PathBuf;

use crate::api::logs::log_warning;

pub const PORT_VAR: &str = "PAYGRID_PORT";
pub const OUTPUT_DIR_VAR: &str = "PAYGRID_OUTPUT_DIR";
pub const DEFAULT_FILENAME_VAR: &str = "PAYGRID_DEFAULT_FILENAME";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_FILENAME: &str = "export";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Port for `serve`
    pub port: u16,
    /// Directory the file sink writes into
    pub output_dir: PathBuf,
    /// Export name when none is given on the command line
    pub default_filename: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            default_filename: DEFAULT_FILENAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = non_blank(lookup(PORT_VAR)) {
            match raw.parse::<u16>() {
                Ok(port) if port > 0 => config.port = port,
                _ => log_warning(format!(
                    "Invalid {}='{}', using {}",
                    PORT_VAR, raw, DEFAULT_PORT
                )),
            }
        }

        if let Some(dir) = non_blank(lookup(OUTPUT_DIR_VAR)) {
            config.output_dir = PathBuf::from(dir);
        }

        if let Some(name) = non_blank(lookup(DEFAULT_FILENAME_VAR)) {
            config.default_filename = name;
        }

        config
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
