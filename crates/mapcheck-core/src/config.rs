use serde::Deserialize;

use crate::{Error, Result};

/// A code system URL, optionally pinned to a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSystemRef {
    pub url: String,
    pub version: Option<String>,
}

impl CodeSystemRef {
    pub fn new(url: impl Into<String>, version: Option<String>) -> Self {
        Self {
            url: url.into(),
            version: non_empty(version),
        }
    }
}

/// Which concept map `$translate` should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConceptMapSelection {
    /// Pin a concept map by canonical URL.
    Explicit(String),
    /// Send no `url` and let the server pick a map for the system pair.
    ServerDefault,
}

impl ConceptMapSelection {
    pub fn from_option(url: Option<String>) -> Self {
        match non_empty(url) {
            Some(url) => Self::Explicit(url),
            None => Self::ServerDefault,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Explicit(url) => Some(url),
            Self::ServerDefault => None,
        }
    }
}

/// The code systems on both sides of the mapping and the map between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConfig {
    pub source: CodeSystemRef,
    pub target: CodeSystemRef,
    pub concept_map: ConceptMapSelection,
}

/// Everything a run needs, however it was sourced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub server_url: String,
    pub verify_tls: bool,
    pub mapping: MappingConfig,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.server_url)
            .map_err(|e| Error::config(format!("server.url '{}': {e}", self.server_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "server.url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.mapping.source.url.trim().is_empty() {
            return Err(Error::config("mapping.source_system must not be empty"));
        }
        if self.mapping.target.url.trim().is_empty() {
            return Err(Error::config("mapping.target_system must not be empty"));
        }
        if let ConceptMapSelection::Explicit(url) = &self.mapping.concept_map
            && url.trim().is_empty()
        {
            return Err(Error::config("mapping.concept_map must not be blank"));
        }
        Ok(())
    }
}

/// On-disk shape of the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    pub server: ServerSection,
    pub mapping: MappingSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    pub url: String,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_verify_tls() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct MappingSection {
    pub source_system: String,
    #[serde(default)]
    pub source_version: Option<String>,
    pub target_system: String,
    #[serde(default)]
    pub target_version: Option<String>,
    #[serde(default)]
    pub concept_map: Option<String>,
}

impl From<FileConfig> for RunConfig {
    fn from(file: FileConfig) -> Self {
        Self {
            server_url: file.server.url,
            verify_tls: file.server.verify_tls,
            mapping: MappingConfig {
                source: CodeSystemRef::new(file.mapping.source_system, file.mapping.source_version),
                target: CodeSystemRef::new(file.mapping.target_system, file.mapping.target_version),
                concept_map: ConceptMapSelection::from_option(file.mapping.concept_map),
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub mod loader {
    use std::path::Path;

    use config::{Config, Environment, File, FileFormat};

    use super::{FileConfig, RunConfig};
    use crate::{Error, Result};

    /// Load a run configuration from a config file, with environment overrides,
    /// e.g. `MAPCHECK__SERVER__URL=https://tx.example.org/fhir`.
    ///
    /// `.toml` is read as TOML and the other extensions the `config` crate
    /// knows (`.json`, `.yaml`, `.ini`, ...) pick their own format. Any other
    /// file, including one without an extension, is read as INI.
    pub fn load_config(path: &Path) -> Result<RunConfig> {
        if !path.exists() {
            return Err(Error::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let file = File::from(path.to_path_buf());
        let file = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => file.format(FileFormat::Toml),
            Some("json" | "json5" | "yaml" | "yml" | "ini" | "ron") => file,
            _ => file.format(FileFormat::Ini),
        };
        let cfg = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("MAPCHECK")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()
            .map_err(|e| Error::config(format!("config build error: {e}")))?;
        let file: FileConfig = cfg
            .try_deserialize()
            .map_err(|e| Error::config(format!("config deserialize error: {e}")))?;
        let run = RunConfig::from(file);
        run.validate()?;
        Ok(run)
    }
}
