use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hermes_log::LogConfig;
use hermes_profiling::{DebugImage, Platform};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Defines the source of a config error
#[derive(Debug, Default)]
enum ConfigErrorSource {
    /// An error occurring independently.
    #[default]
    None,
    /// An error originating from a configuration file.
    File(PathBuf),
    /// An error originating in a field override (an env var, or a CLI parameter).
    FieldOverride(String),
}

impl fmt::Display for ConfigErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorSource::None => Ok(()),
            ConfigErrorSource::File(file_name) => {
                write!(f, " (file {})", file_name.display())
            }
            ConfigErrorSource::FieldOverride(name) => write!(f, " (field {name})"),
        }
    }
}

/// Indicates config related errors.
#[derive(Debug)]
pub struct ConfigError {
    source: ConfigErrorSource,
    kind: ConfigErrorKind,
    inner: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ConfigError {
    #[inline]
    fn new(kind: ConfigErrorKind) -> Self {
        Self {
            source: ConfigErrorSource::None,
            kind,
            inner: None,
        }
    }

    #[inline]
    fn wrap<E>(inner: E, kind: ConfigErrorKind) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            source: ConfigErrorSource::None,
            kind,
            inner: Some(Box::new(inner)),
        }
    }

    #[inline]
    fn field(field: &'static str) -> Self {
        Self {
            source: ConfigErrorSource::FieldOverride(field.to_owned()),
            kind: ConfigErrorKind::InvalidValue,
            inner: None,
        }
    }

    #[inline]
    fn file(mut self, p: impl AsRef<Path>) -> Self {
        self.source = ConfigErrorSource::File(p.as_ref().to_path_buf());
        self
    }

    /// Returns the error kind of the error.
    pub fn kind(&self) -> ConfigErrorKind {
        self.kind
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.source)
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner
            .as_ref()
            .map(|err| err.as_ref() as &(dyn Error + 'static))
    }
}

/// Indicates config related errors.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigErrorKind {
    /// Failed to open the file.
    #[error("could not open config file")]
    CouldNotOpenFile,
    /// Parsing YAML failed.
    #[error("could not parse yaml config file")]
    BadYaml,
    /// Parsing JSON failed.
    #[error("could not parse json config file")]
    BadJson,
    /// Invalid config value
    #[error("invalid config value")]
    InvalidValue,
}

enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yml",
            ConfigFormat::Json => "json",
        }
    }
}

trait ConfigObject: DeserializeOwned + Serialize {
    /// The basename of the config file.
    fn name() -> &'static str;

    /// Returns the first config file within the given directory, YAML taking precedence.
    fn find(base: &Path) -> Option<(PathBuf, ConfigFormat)> {
        [ConfigFormat::Yaml, ConfigFormat::Json]
            .into_iter()
            .map(|format| {
                let path = base.join(format!("{}.{}", Self::name(), format.extension()));
                (path, format)
            })
            .find(|(path, _)| path.exists())
    }

    /// Loads the config file from the given path.
    fn load(path: &Path, format: ConfigFormat) -> Result<Self, ConfigError> {
        let f = fs::File::open(path)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::CouldNotOpenFile).file(path))?;

        match format {
            ConfigFormat::Yaml => serde_yaml::from_reader(io::BufReader::new(f))
                .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadYaml).file(path)),
            ConfigFormat::Json => serde_json::from_reader(io::BufReader::new(f))
                .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadJson).file(path)),
        }
    }
}

/// Default number of completed profiles kept until their transaction is sent.
pub const DEFAULT_QUEUE_CAPACITY: usize = 20;

fn default_true() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_environment() -> String {
    "production".to_owned()
}

/// Controls when and how profiles are recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingOptions {
    /// Fraction of sampled root spans that are profiled, between `0.0` and `1.0`.
    ///
    /// Profiling is disabled if this is not set.
    profiles_sample_rate: Option<f64>,
    /// Whether the native platform sampler runs next to the Hermes profiler.
    #[serde(default = "default_true")]
    platform_profilers: bool,
    /// The platform the application runs on.
    platform: Platform,
    /// Number of completed profiles kept until their transaction is sent.
    #[serde(default = "default_queue_capacity")]
    queue_capacity: usize,
    /// Environment of profiles whose transaction does not declare one.
    #[serde(default = "default_environment")]
    default_environment: String,
    /// Source maps of the JavaScript bundles, attached to every profile.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    debug_images: Vec<DebugImage>,
}

impl Default for ProfilingOptions {
    fn default() -> Self {
        Self {
            profiles_sample_rate: None,
            platform_profilers: true,
            platform: Platform::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            default_environment: default_environment(),
            debug_images: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigValues {
    profiling: ProfilingOptions,
    logging: LogConfig,
}

impl ConfigObject for ConfigValues {
    fn name() -> &'static str {
        "config"
    }
}

/// Command line or environment overrides of the configuration.
#[derive(Debug, Default)]
pub struct OverridableConfig {
    /// Overrides `profiling.profiles_sample_rate`.
    pub profiles_sample_rate: Option<String>,
    /// Overrides `profiling.platform`.
    pub platform: Option<String>,
    /// Overrides `profiling.platform_profilers`.
    pub platform_profilers: Option<String>,
}

/// Config struct.
#[derive(Clone, Debug, Default)]
pub struct Config {
    values: ConfigValues,
    path: PathBuf,
}

impl Config {
    /// Loads a config from a given config folder.
    ///
    /// Reads `config.yml`, or `config.json` if there is no YAML file. A folder without either
    /// yields the default configuration.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref().to_path_buf();

        let values = match ConfigValues::find(&path) {
            Some((file, format)) => ConfigValues::load(&file, format)?,
            None => ConfigValues::default(),
        };

        let config = Config { values, path };
        config.validate()?;
        Ok(config)
    }

    /// Parses a config from an embedded YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Config, ConfigError> {
        let config = Config {
            values: serde_yaml::from_str(yaml)
                .map_err(|err| ConfigError::wrap(err, ConfigErrorKind::BadYaml))?,
            path: PathBuf::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Creates a config from a JSON value.
    ///
    /// This is mostly useful for tests.
    pub fn from_json_value(value: serde_json::Value) -> Result<Config, ConfigError> {
        let config = Config {
            values: serde_json::from_value(value)
                .map_err(|err| ConfigError::wrap(err, ConfigErrorKind::BadJson))?,
            path: PathBuf::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Override configuration with values coming from other sources (e.g. env variables or
    /// command line parameters)
    pub fn apply_override(
        &mut self,
        overrides: OverridableConfig,
    ) -> Result<&mut Self, ConfigError> {
        let profiling = &mut self.values.profiling;

        if let Some(rate) = overrides.profiles_sample_rate {
            let rate = rate
                .parse::<f64>()
                .map_err(|_| ConfigError::field("profiles_sample_rate"))?;
            profiling.profiles_sample_rate = Some(rate);
        }

        if let Some(platform) = overrides.platform {
            profiling.platform = match platform.as_str() {
                "ios" => Platform::Ios,
                "android" => Platform::Android,
                _ => return Err(ConfigError::field("platform")),
            };
        }

        if let Some(enabled) = overrides.platform_profilers {
            profiling.platform_profilers = enabled
                .parse()
                .map_err(|_| ConfigError::field("platform_profilers"))?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let profiling = &self.values.profiling;

        let valid_rate = |rate: f64| (0.0..=1.0).contains(&rate);
        if profiling.profiles_sample_rate.is_some_and(|rate| !valid_rate(rate)) {
            return Err(ConfigError::new(ConfigErrorKind::InvalidValue).file(&self.path));
        }

        if profiling.queue_capacity == 0 {
            return Err(ConfigError::new(ConfigErrorKind::InvalidValue).file(&self.path));
        }

        Ok(())
    }

    /// Returns the path of the config folder.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the logging configuration.
    pub fn logging(&self) -> &LogConfig {
        &self.values.logging
    }

    /// Returns the fraction of sampled root spans that are profiled.
    ///
    /// `None` disables profiling.
    pub fn profiles_sample_rate(&self) -> Option<f64> {
        self.values.profiling.profiles_sample_rate
    }

    /// Returns `true` if the native platform sampler runs next to the Hermes profiler.
    pub fn platform_profilers(&self) -> bool {
        self.values.profiling.platform_profilers
    }

    /// Returns the platform the application runs on.
    pub fn platform(&self) -> Platform {
        self.values.profiling.platform
    }

    /// Returns the number of completed profiles kept until their transaction is sent.
    pub fn queue_capacity(&self) -> usize {
        self.values.profiling.queue_capacity
    }

    /// Returns the environment of profiles whose transaction does not declare one.
    pub fn default_environment(&self) -> &str {
        &self.values.profiling.default_environment
    }

    /// Returns the source map images attached to every profile.
    pub fn debug_images(&self) -> &[DebugImage] {
        &self.values.profiling.debug_images
    }
}
