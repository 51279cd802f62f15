//! Checks applied to a resolved crate before a notebook entry is created.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    archive,
    config::{Config, DEFAULT_MAX_METADATA_BYTES},
    reader::{self, Resolution},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Software name the crate must have been produced by.
    pub expected_publisher: String,
    /// Used as the entry document when the crate carries no payload.
    pub fallback_content: Option<String>,
    /// Largest metadata file [ingest_archive] will read.
    pub max_metadata_bytes: u64,
}

impl IngestOptions {
    pub fn new(expected_publisher: impl Into<String>) -> Self {
        Self {
            expected_publisher: expected_publisher.into(),
            fallback_content: None,
            max_metadata_bytes: DEFAULT_MAX_METADATA_BYTES,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            max_metadata_bytes: config.max_metadata_bytes,
            ..Self::new(config.publisher.as_str())
        }
    }

    pub fn with_fallback_content(mut self, content: impl Into<String>) -> Self {
        self.fallback_content = Some(content.into());
        self
    }
}

/// Everything needed to register a new entry under its parent object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub parent_perm_id: String,
    /// Kind of the parent object; empty if the crate does not say.
    pub parent_type: String,
    pub entry_type: String,
    pub name: String,
    pub document: String,
    pub creator: String,
    pub publisher: String,
    /// `document` came from [IngestOptions::fallback_content].
    pub used_fallback: bool,
}

fn required(value: Option<&String>, message: &str) -> crate::Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(crate::Error::validation(message)),
    }
}

pub fn prepare_entry(resolution: &Resolution, options: &IngestOptions) -> crate::Result<EntryDraft> {
    let content = &resolution.content;
    let creator = required(content.creator_name.as_ref(), "ERROR parsing userName")?;
    let parent_perm_id = required(content.root_id.as_ref(), "ERROR parsing permID")?;

    let publisher = content.software_name.clone().unwrap_or_default();
    if publisher != options.expected_publisher {
        log::warn!("rejecting crate published by {publisher:?}");
        return Err(crate::Error::validation(
            "Incoming file is not a valid OMERO *.eln.",
        ));
    }

    let entry_type = required(content.object_type.as_ref(), "ERROR parsing entry type")?;
    let name = required(content.object_name.as_ref(), "ERROR parsing entry name")?;

    let (document, used_fallback) = match (&content.value, &options.fallback_content) {
        (Some(v), _) if !v.is_empty() => (v.clone(), false),
        (_, Some(fallback)) => {
            log::warn!(
                "no content for {parent_perm_id}, using fallback ({})",
                resolution.diagnostics
            );
            (fallback.clone(), true)
        }
        _ => {
            return Err(crate::Error::validation("ERROR parsing entry content"));
        }
    };

    log::info!("prepared {entry_type} {name:?} under {parent_perm_id} for {creator}");
    Ok(EntryDraft {
        parent_perm_id,
        parent_type: content.root_type.clone().unwrap_or_default(),
        entry_type,
        name,
        document,
        creator,
        publisher,
        used_fallback,
    })
}

/// Read, resolve and check an `.eln` archive.
pub fn ingest_archive(path: &Path, options: &IngestOptions) -> crate::Result<EntryDraft> {
    log::info!("incoming data at {}", path.display());
    let document = archive::read_document(path, options.max_metadata_bytes)?;
    let resolution = reader::resolve(&document);
    prepare_entry(&resolution, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ResolvedContent;

    const PUBLISHER: &str = "OMERO Web Server OS";

    fn resolution() -> Resolution {
        Resolution {
            content: ResolvedContent {
                root_id: Some("20240101123456789-42".into()),
                root_type: Some("".into()),
                software_name: Some(PUBLISHER.into()),
                creator_name: Some("jdoe".into()),
                object_type: Some("ENTRY".into()),
                object_name: Some("OMERO data".into()),
                value: Some("<table></table>".into()),
            },
            diagnostics: Default::default(),
        }
    }

    fn message(err: crate::Error) -> String {
        match err {
            crate::Error::Validation(m) => m,
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn accepts_complete_content() {
        let draft = prepare_entry(&resolution(), &IngestOptions::new(PUBLISHER)).unwrap();
        assert_eq!(draft.parent_perm_id, "20240101123456789-42");
        assert_eq!(draft.document, "<table></table>");
        assert_eq!(draft.entry_type, "ENTRY");
        assert!(!draft.used_fallback);
    }

    #[test]
    fn missing_user_checked_first() {
        let mut r = resolution();
        r.content.creator_name = None;
        r.content.root_id = None;
        let err = prepare_entry(&r, &IngestOptions::new(PUBLISHER)).unwrap_err();
        assert_eq!(message(err), "ERROR parsing userName");
    }

    #[test]
    fn missing_perm_id() {
        let mut r = resolution();
        r.content.root_id = Some(String::new());
        let err = prepare_entry(&r, &IngestOptions::new(PUBLISHER)).unwrap_err();
        assert_eq!(message(err), "ERROR parsing permID");
    }

    #[test]
    fn foreign_publisher() {
        let mut r = resolution();
        r.content.software_name = None;
        let err = prepare_entry(&r, &IngestOptions::new(PUBLISHER)).unwrap_err();
        assert_eq!(message(err), "Incoming file is not a valid OMERO *.eln.");
    }

    #[test]
    fn fallback_content() {
        let mut r = resolution();
        r.content.value = None;
        let err = prepare_entry(&r, &IngestOptions::new(PUBLISHER)).unwrap_err();
        assert_eq!(message(err), "ERROR parsing entry content");

        let options = IngestOptions::new(PUBLISHER).with_fallback_content("<h2>failed</h2>");
        let draft = prepare_entry(&r, &options).unwrap();
        assert_eq!(draft.document, "<h2>failed</h2>");
        assert!(draft.used_fallback);
    }
}
