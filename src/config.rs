// file: src/config.rs
// description: application configuration management with toml and env support
// reference: https://docs.rs/config

use crate::error::{LoadTestError, Result};
use crate::models::ArtifactId;
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "CLAIR_LOAD_TEST";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub report: ReportConfig,
    pub http: HttpConfig,
    pub manifest: ManifestConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    pub host: String,
    /// Comma-separated artifact references.
    pub containers: String,
    pub concurrency: usize,
    pub psk: String,
    pub delete: bool,
    #[serde(with = "duration_str")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,
    #[serde(with = "duration_str")]
    pub connect_timeout: Duration,
    #[serde(with = "duration_str")]
    pub pool_idle_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestConfig {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub issuer: String,
    #[serde(with = "duration_str")]
    pub token_lifetime: Duration,
}

/// Validated, immutable input of one dispatcher run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub host: String,
    pub artifacts: Vec<ArtifactId>,
    pub concurrency: usize,
    pub timeout: Duration,
    pub delete: bool,
}

impl RunConfig {
    pub fn new(
        host: &str,
        artifacts: Vec<ArtifactId>,
        concurrency: usize,
        timeout: Duration,
        delete: bool,
    ) -> Result<Self> {
        let config = Self {
            host: host.trim_end_matches('/').to_string(),
            artifacts,
            concurrency,
            timeout,
            delete,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Validator::validate_url(&self.host)?;
        Validator::validate_artifacts(&self.artifacts)?;
        Validator::validate_concurrency(self.concurrency, self.artifacts.len())?;
        Validator::validate_timeout(self.timeout)?;
        Ok(())
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = Self::default_config();
        let mut builder = config::Config::builder()
            .add_source(
                config::Config::try_from(&defaults)
                    .map_err(|e| LoadTestError::Config(e.to_string()))?,
            );

        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        builder = builder.add_source(config::File::from(path).required(false));

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| LoadTestError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| LoadTestError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            report: ReportConfig {
                host: "http://localhost:6060/".to_string(),
                containers: String::new(),
                concurrency: 1,
                psk: String::new(),
                delete: false,
                timeout: Duration::from_secs(60),
            },
            http: HttpConfig {
                request_timeout: Duration::from_secs(60),
                connect_timeout: Duration::from_secs(10),
                pool_idle_timeout: Duration::from_secs(90),
            },
            manifest: ManifestConfig {
                program: "clairctl".to_string(),
                args: vec!["manifest".to_string()],
            },
            auth: AuthConfig {
                issuer: "clairctl".to_string(),
                token_lifetime: Duration::from_secs(600),
            },
        }
    }

    /// Builds the run input from the `report` section. Fails on anything the
    /// dispatcher would reject.
    pub fn run_config(&self) -> Result<RunConfig> {
        RunConfig::new(
            &self.report.host,
            ArtifactId::parse_list(&self.report.containers),
            self.report.concurrency,
            self.report.timeout,
            self.report.delete,
        )
    }

    fn validate(&self) -> Result<()> {
        if self.http.request_timeout.is_zero() {
            return Err(LoadTestError::Config(
                "http.request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.manifest.program.trim().is_empty() {
            return Err(LoadTestError::Config(
                "manifest.program must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Human-readable durations (`90s`, `1m`, `250ms`) in config files and
/// environment variables.
mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file() -> NamedTempFile {
        tempfile::Builder::new().suffix(".toml").tempfile().unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let config = Config::load(Some(&missing)).unwrap();

        assert_eq!(config.report.concurrency, 1);
        assert_eq!(config.report.timeout, Duration::from_secs(60));
        assert_eq!(config.manifest.program, "clairctl");
        assert_eq!(config.auth.issuer, "clairctl");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = toml_file();
        writeln!(
            file,
            r#"
[report]
host = "http://clair.example:6060/"
containers = "ubuntu:latest,mysql:latest"
concurrency = 2
timeout = "250ms"

[http]
request_timeout = "5s"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.report.concurrency, 2);
        assert_eq!(config.report.timeout, Duration::from_millis(250));
        assert_eq!(config.http.request_timeout, Duration::from_secs(5));
        assert_eq!(config.http.connect_timeout, Duration::from_secs(10));

        let run = config.run_config().unwrap();
        assert_eq!(run.host, "http://clair.example:6060");
        assert_eq!(
            run.artifacts,
            vec![
                ArtifactId::from("ubuntu:latest"),
                ArtifactId::from("mysql:latest")
            ]
        );
    }

    #[test]
    fn test_bad_duration_is_config_error() {
        let mut file = toml_file();
        writeln!(file, "[report]\ntimeout = \"soon\"").unwrap();

        let result = Config::load(Some(file.path()));
        assert!(matches!(result, Err(LoadTestError::Config(_))));
    }

    #[test]
    fn test_run_config_rejects_concurrency_above_artifacts() {
        let mut config = Config::default_config();
        config.report.containers = "a,b".to_string();
        config.report.concurrency = 3;

        let err = config.run_config().unwrap_err();
        assert!(matches!(err, LoadTestError::Config(_)));
    }

    #[test]
    fn test_run_config_rejects_empty_artifacts() {
        let config = Config::default_config();
        assert!(config.run_config().is_err());
    }

    #[test]
    fn test_duration_round_trips_through_config() {
        let defaults = Config::default_config();
        let value = config::Config::try_from(&defaults).unwrap();
        let parsed: Config = value.try_deserialize().unwrap();
        assert_eq!(parsed.report.timeout, defaults.report.timeout);
        assert_eq!(parsed.auth.token_lifetime, defaults.auth.token_lifetime);
    }
}
