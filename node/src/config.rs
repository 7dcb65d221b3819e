use std::{env, fmt, num::ParseIntError, path::PathBuf};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Start-up configuration of the service, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub regression_model: PathBuf,
}

#[derive(Debug)]
pub struct InvalidPort {
    value: String,
    source: ParseIntError,
}

impl fmt::Display for InvalidPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid PORT {:?}: {}", self.value, self.source)
    }
}

impl std::error::Error for InvalidPort {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl NodeConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, InvalidPort> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Arguments
    /// * `var` - Returns the value of the named variable, if set.
    ///
    /// # Errors
    /// `InvalidPort` if `PORT` is set but isn't a valid port number.
    pub fn from_vars<F>(var: F) -> Result<Self, InvalidPort>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("PORT") {
            Some(value) => value
                .parse()
                .map_err(|source| InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        let data_dir = var("DATA_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);
        let under_data = |key: &str, default: &str| {
            var(key).map_or_else(|| data_dir.join(default), PathBuf::from)
        };

        Ok(Self {
            host,
            port,
            models_dir: under_data("MODELS_DIR", "models"),
            cache_dir: under_data("CACHE_DIR", "cache"),
            regression_model: under_data("REGRESSION_MODEL", "regression_model.json"),
            data_dir,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<NodeConfig, InvalidPort> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        NodeConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_live_under_the_current_directory() {
        let config = config(&[]).unwrap();

        assert_eq!(config.addr(), "0.0.0.0:8000");
        assert_eq!(config.models_dir, PathBuf::from("./models"));
        assert_eq!(config.cache_dir, PathBuf::from("./cache"));
        assert_eq!(
            config.regression_model,
            PathBuf::from("./regression_model.json")
        );
    }

    #[test]
    fn paths_follow_data_dir_unless_overridden() {
        let config = config(&[
            ("DATA_DIR", "/srv/bodymesh"),
            ("CACHE_DIR", "/tmp/glb"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9001"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:9001");
        assert_eq!(config.models_dir, PathBuf::from("/srv/bodymesh/models"));
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/glb"));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("eighty"));
    }
}
