use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{
    config::Config,
    entity::{
        COMPLETED_ACTION_STATUS, CreateAction, CreatorInfo, DataEntity, DataEntityInfo,
        Instrument, MetadataDescriptor, Person, RootDataset, RootInfo, SoftwareApplication,
        SoftwareInfo,
    },
    graph::{GraphDocument, METADATA_FILE, Node, ROOT_ID, Reference},
};

const MISSING_IDENTITY: &str = "missing required identity field";

/// Build the metadata document for one export, stamped with the current time.
///
/// Nodes are emitted in a fixed order: metadata descriptor, root, person,
/// software, provenance action, data entity.
pub fn build_document(
    config: &Config,
    root: &RootInfo,
    creator: &CreatorInfo,
    software: &SoftwareInfo,
    data: &DataEntityInfo,
) -> crate::Result<GraphDocument> {
    build_document_at(config, root, creator, software, data, Utc::now())
}

/// As [build_document], with every timestamp set to `now`.
pub fn build_document_at(
    config: &Config,
    root: &RootInfo,
    creator: &CreatorInfo,
    software: &SoftwareInfo,
    data: &DataEntityInfo,
    now: DateTime<Utc>,
) -> crate::Result<GraphDocument> {
    if creator.alternate_name.is_empty() || software.id.is_empty() || data.id.is_empty() {
        return Err(crate::Error::validation(MISSING_IDENTITY));
    }
    let person_id = creator.id();
    check_unique_ids(&[
        METADATA_FILE,
        ROOT_ID,
        &person_id,
        &software.id,
        &config.provenance_id,
        &data.id,
    ])?;
    log::debug!(
        "building crate for {} by {person_id} at {now}",
        root.identifier
    );

    let mut doc = GraphDocument::new(config.context.as_str());
    doc.push(Node::from_serializable(&MetadataDescriptor::new(
        &config.conforms_to,
    ))?);
    doc.push(Node::from_serializable(&RootDataset {
        id: ROOT_ID.into(),
        kind: "Dataset".into(),
        name: root.name.clone(),
        identifier: root.identifier.clone(),
        additional_type: root.additional_type.clone(),
        creator: Reference::new(&person_id),
        author: Reference::new(&person_id),
        date_created: now,
        date_modified: now,
        date_published: now,
        has_part: Reference::new(&data.id),
    })?);
    doc.push(Node::from_serializable(&Person {
        id: person_id.clone(),
        kind: "Person".into(),
        alternate_name: creator.alternate_name.clone(),
        given_name: creator.given_name.clone(),
        family_name: creator.family_name.clone(),
    })?);
    doc.push(Node::from_serializable(&SoftwareApplication {
        id: software.id.clone(),
        kind: "SoftwareApplication".into(),
        name: software.name.clone(),
        install_url: Reference::new(&software.install_url),
        software_version: software.version.clone(),
    })?);
    doc.push(Node::from_serializable(&CreateAction {
        id: config.provenance_id.clone(),
        kind: "CreateAction".into(),
        name: "RO-Crate created".into(),
        description: "provenance of entity".into(),
        object: ROOT_ID.into(),
        instrument: Instrument {
            id: software.id.clone(),
            description: "Software that was used to produce this file".into(),
        },
        action_status: COMPLETED_ACTION_STATUS.into(),
        end_time: now,
    })?);
    doc.push(Node::from_serializable(&DataEntity {
        id: data.id.clone(),
        kind: "Dataset".into(),
        additional_type: data.additional_type.clone(),
        name: data.name.clone(),
        identifier: root.identifier.clone(),
        text: data.text.clone(),
        creator: Reference::new(&person_id),
        author: Reference::new(&person_id),
        date_created: now,
        date_modified: now,
    })?);
    Ok(doc)
}

/// Lookups resolve an `@id` to its first node, so a shared id would hide
/// every later node carrying it.
fn check_unique_ids(ids: &[&str]) -> crate::Result<()> {
    for (idx, id) in ids.iter().enumerate() {
        if ids[..idx].contains(id) {
            return Err(crate::Error::validation(format!("duplicate node id {id:?}")));
        }
    }
    Ok(())
}

/// Write the document as 4-space indented JSON.
///
/// Node properties are emitted in sorted key order, so output is stable.
pub fn write_to<W: Write>(document: &GraphDocument, writer: W) -> crate::Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    document.serialize(&mut ser).map_err(|e| {
        if e.is_io() {
            crate::Error::Io(e.into())
        } else {
            crate::Error::general(format!("could not serialize document: {e}"))
        }
    })
}

pub fn serialize(document: &GraphDocument) -> crate::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_to(document, &mut buf)?;
    Ok(buf)
}
