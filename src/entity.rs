//! Typed records for the entities of an export.
//!
//! The `*Info` structs are what callers supply; the remaining structs are the
//! node shapes written into `@graph`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    graph::{METADATA_FILE, ROOT_ID, Reference},
};

pub const COMPLETED_ACTION_STATUS: &str = "http://schema.org/CompletedActionStatus";

/// The notebook object an export is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RootInfo {
    pub name: String,
    /// Permanent identifier of the notebook object.
    pub identifier: String,
    /// Kind of notebook object, e.g. `Experiment`. Empty if unknown.
    pub additional_type: String,
}

impl RootInfo {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            name: "parent dataset".into(),
            identifier: identifier.into(),
            additional_type: String::new(),
        }
    }

    pub fn with_additional_type(mut self, additional_type: impl Into<String>) -> Self {
        self.additional_type = additional_type.into();
        self
    }
}

/// The user who ran the export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreatorInfo {
    /// Username in the image server. Must not be empty.
    pub alternate_name: String,
    pub given_name: String,
    pub family_name: String,
}

impl CreatorInfo {
    pub fn new(
        alternate_name: impl Into<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            alternate_name: alternate_name.into(),
            given_name: given_name.into(),
            family_name: family_name.into(),
        }
    }

    /// Split a display name on whitespace into given and family name.
    ///
    /// Only the first two words are used.
    pub fn from_full_name(username: impl Into<String>, full_name: &str) -> Self {
        let mut parts = full_name.split_whitespace();
        let given = parts.next().unwrap_or_default();
        let family = parts.next().unwrap_or_default();
        Self::new(username, given, family)
    }

    pub fn id(&self) -> String {
        format!("#{}", self.alternate_name)
    }
}

/// The tool that produced the export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoftwareInfo {
    pub id: String,
    pub name: String,
    pub install_url: String,
    pub version: String,
}

impl SoftwareInfo {
    /// The image server, as named in `config`.
    pub fn omero(config: &Config) -> Self {
        Self {
            id: "#OMERO".into(),
            name: config.publisher.clone(),
            install_url: config.omero_uri.clone(),
            version: "0.1.0".into(),
        }
    }
}

/// The child dataset carrying the exported payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataEntityInfo {
    /// Any non-empty URI or string.
    pub id: String,
    pub name: String,
    /// Entry kind created on ingest, `ENTRY` by default.
    pub additional_type: String,
    /// Opaque payload, usually an HTML table.
    pub text: String,
}

impl DataEntityInfo {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "OMERO data".into(),
            additional_type: "ENTRY".into(),
            text: text.into(),
        }
    }
}

/// Self-description of the metadata file; always the first node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDescriptor {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub about: Reference,
    pub conforms_to: Reference,
}

impl MetadataDescriptor {
    pub fn new(conforms_to: &str) -> Self {
        Self {
            id: METADATA_FILE.into(),
            kind: "CreativeWork".into(),
            about: ROOT_ID.into(),
            conforms_to: conforms_to.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootDataset {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub identifier: String,
    pub additional_type: String,
    pub creator: Reference,
    pub author: Reference,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub date_published: DateTime<Utc>,
    pub has_part: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub alternate_name: String,
    pub given_name: String,
    pub family_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareApplication {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub install_url: Reference,
    pub software_version: String,
}

/// Reference to the software, annotated with its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(rename = "@id")]
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAction {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub object: Reference,
    pub instrument: Instrument,
    pub action_status: Reference,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntity {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub additional_type: String,
    pub name: String,
    pub identifier: String,
    pub text: String,
    pub creator: Reference,
    pub author: Reference,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}
