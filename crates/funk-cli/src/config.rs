use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Values a funk command may need, each resolvable from several layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Source,
    Bucket,
    Object,
    StoreRoot,
    Extension,
}

impl Key {
    /// Environment variable consulted for this key.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Source => "FUNK_SOURCE",
            Self::Bucket => "FUNK_BUCKET",
            Self::Object => "FUNK_OBJECT",
            Self::StoreRoot => "FUNK_STORE_ROOT",
            Self::Extension => "FUNK_EXTENSION",
        }
    }

    /// Built-in fallback; `None` means the value must be supplied.
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            Self::Source => Some("."),
            Self::Bucket => None,
            Self::Object => Some("test-sample.tar"),
            Self::StoreRoot => Some(".funk-store"),
            Self::Extension => Some(funk_archive::DEFAULT_EXTENSION),
        }
    }

    fn file_value(self, file: &FileConfig) -> Option<&str> {
        match self {
            Self::Source => file.source.as_deref(),
            Self::Bucket => file.bucket.as_deref(),
            Self::Object => file.object.as_deref(),
            Self::StoreRoot => file.store_root.as_deref(),
            Self::Extension => file.extension.as_deref(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{env} should be set (or pass the matching flag)")]
    Missing { env: &'static str },

    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Optional TOML config file contents.
///
/// ```toml
/// bucket = "config-backups"
/// object = "prod.tar"
/// source = "infra/prod"
/// store_root = "/var/lib/funk"
/// extension = "tf"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<String>,
    pub bucket: Option<String>,
    pub object: Option<String>,
    pub store_root: Option<String>,
    pub extension: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Resolves each [`Key`] with precedence flag > environment > config file > default.
///
/// Empty strings at any layer count as unset.
pub struct Settings {
    file: FileConfig,
    env: EnvLookup,
}

impl Settings {
    /// Settings reading the process environment.
    pub fn new(file: FileConfig) -> Self {
        Self::with_env(file, |key| std::env::var(key).ok())
    }

    /// Settings with a custom environment lookup.
    pub fn with_env(file: FileConfig, env: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            file,
            env: Box::new(env),
        }
    }

    /// Load `path` if given, otherwise start from an empty file layer.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::new(file))
    }

    /// Resolve `key`, or `None` if no layer supplies a non-empty value.
    pub fn resolve(&self, key: Key, flag: Option<&str>) -> Option<String> {
        let non_empty = |v: &str| !v.is_empty();
        flag.filter(|v| non_empty(v))
            .map(str::to_string)
            .or_else(|| (self.env)(key.env_var()).filter(|v| non_empty(v)))
            .or_else(|| key.file_value(&self.file).filter(|v| non_empty(v)).map(str::to_string))
            .or_else(|| key.default_value().map(str::to_string))
    }

    /// Resolve `key`, failing fast if it ends up empty.
    pub fn require(&self, key: Key, flag: Option<&str>) -> Result<String, ConfigError> {
        self.resolve(key, flag)
            .ok_or(ConfigError::Missing { env: key.env_var() })
    }
}

/// What the transfer core needs from configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferTarget {
    pub source_dir: PathBuf,
    pub container: String,
    pub object: String,
}

impl TransferTarget {
    pub fn resolve(
        settings: &Settings,
        source: Option<&str>,
        bucket: Option<&str>,
        object: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            source_dir: PathBuf::from(settings.require(Key::Source, source)?),
            container: settings.require(Key::Bucket, bucket)?,
            object: settings.require(Key::Object, object)?,
        })
    }
}
