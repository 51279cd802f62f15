use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::graph::ROOT_ID;

/// Default upper bound on the size of an incoming metadata file.
pub const DEFAULT_MAX_METADATA_BYTES: u64 = 16 * 1024 * 1024;

/// Notebook system receiving the exported archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElnType {
    #[default]
    Openbis,
    Elabftw,
}

/// Settings shared by the export and ingest paths.
///
/// Passed explicitly to every entry point which needs it.
/// All fields have defaults, so a TOML file only has to name what differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-LD context URI written to every document.
    pub context: String,
    /// Profile URI referenced by the metadata descriptor's `conformsTo`.
    pub conforms_to: String,
    /// `@id` of the provenance action.
    pub provenance_id: String,
    /// Directory in which the crate folder and archive are built.
    pub output_path: PathBuf,
    /// Directory the finished `.eln` is moved to, e.g. an openBIS dropbox.
    pub eln_share: Option<PathBuf>,
    pub eln_type: ElnType,
    /// Base URL of the notebook instance; object links must start with it.
    pub eln_uri: String,
    /// Base URL of the image server, used as the software install URL.
    pub omero_uri: String,
    /// Software name an incoming archive must have been produced by.
    pub publisher: String,
    /// Largest `ro-crate-metadata.json` read from an incoming archive.
    pub max_metadata_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context: "https://w3id.org/ro/crate/1.1/context".into(),
            conforms_to: "https://w3id.org/ro/crate/1.1".into(),
            provenance_id: "#ro-crate_created".into(),
            output_path: std::env::temp_dir(),
            eln_share: None,
            eln_type: ElnType::default(),
            eln_uri: "https://my.eln.de".into(),
            omero_uri: "https://my.omero.de".into(),
            publisher: "OMERO Web Server OS".into(),
            max_metadata_bytes: DEFAULT_MAX_METADATA_BYTES,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        log::debug!("loading configuration from {}", path.display());
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.context.is_empty() {
            return Err(crate::Error::validation("context must not be empty"));
        }
        if self.provenance_id.is_empty() || self.provenance_id == ROOT_ID {
            return Err(crate::Error::validation(format!(
                "invalid provenance_id {:?}",
                self.provenance_id
            )));
        }
        if self.publisher.is_empty() {
            return Err(crate::Error::validation("publisher must not be empty"));
        }
        if self.max_metadata_bytes == 0 {
            return Err(crate::Error::validation("max_metadata_bytes must be positive"));
        }
        Ok(())
    }
}
