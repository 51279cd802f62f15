//! Resolve the fixed node roles of an incoming crate.
//!
//! Every lookup is a pure read of the document. A missing link degrades the
//! fields that depend on it and is recorded in [Diagnostics]; it never stops
//! the other fields from being resolved.

use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    graph::{GraphDocument, Node, ROOT_ID},
};

pub const PROP_ID: &str = "identifier";
pub const PROP_TYPE: &str = "additionalType";
pub const PROP_VALUE: &str = "text";
pub const PROP_NAME: &str = "name";
pub const PROP_DATA_ITEM: &str = "hasPart";
pub const PROP_SOFTWARE_ITEM: &str = "instrument";
pub const PROP_USER_ITEM: &str = "creator";
pub const PROP_USER_NAME: &str = "alternateName";

/// Decode document bytes. Fails if they are not a JSON object.
pub fn parse(bytes: &[u8]) -> crate::Result<GraphDocument> {
    let doc: GraphDocument = serde_json::from_slice(bytes)?;
    log::debug!("parsed crate with {} nodes", doc.len());
    Ok(doc)
}

/// Fields extracted for ingest. Each is independently optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedContent {
    /// Root `identifier`: the parent object's permanent id.
    pub root_id: Option<String>,
    /// Root `additionalType`: the parent object's kind.
    pub root_type: Option<String>,
    pub software_name: Option<String>,
    /// `alternateName` of the data entity's creator, else the root's.
    pub creator_name: Option<String>,
    pub object_type: Option<String>,
    pub object_name: Option<String>,
    /// Opaque payload of the data entity.
    pub value: Option<String>,
}

/// Best-effort content plus everything that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub content: ResolvedContent,
    pub diagnostics: Diagnostics,
}

impl Resolution {
    /// The first diagnostic message, or `""` if resolution was clean.
    pub fn first_error(&self) -> String {
        self.diagnostics.first()
    }
}

pub fn find_root(doc: &GraphDocument) -> Option<&Node> {
    doc.find_by_id(ROOT_ID)
}

/// First `CreateAction` whose `object` points at `object_id`.
///
/// Scans all actions; ids are not assumed unique.
pub fn find_provenance_action<'a>(doc: &'a GraphDocument, object_id: &str) -> Option<&'a Node> {
    doc.find_by_type("CreateAction")
        .find(|action| action.reference("object") == Some(object_id))
}

/// Target of an action's `instrument` reference.
pub fn find_software_of<'a>(doc: &'a GraphDocument, action: &Node) -> Option<&'a Node> {
    doc.find_by_id(action.reference(PROP_SOFTWARE_ITEM)?)
}

/// Name of the software which created the root, via its provenance action.
///
/// A crate without any provenance action for the root yields `None` and
/// records nothing: a crate carrying only root, data entity and creator is a
/// clean resolution. An action whose instrument is missing, dangling or
/// unnamed is recorded.
pub fn find_software_name<'a>(
    doc: &'a GraphDocument,
    diagnostics: &mut Diagnostics,
) -> Option<&'a str> {
    let Some(action) = find_provenance_action(doc, ROOT_ID) else {
        log::debug!("no provenance action for {ROOT_ID}");
        return None;
    };
    let action_id = action.id().unwrap_or_default();
    let Some(target) = action.reference(PROP_SOFTWARE_ITEM) else {
        diagnostics.push(Diagnostic::NoInstrument {
            action: action_id.to_owned(),
        });
        return None;
    };
    match find_software_of(doc, action) {
        Some(software) => {
            let name = software.get_str(PROP_NAME);
            if name.is_none() {
                diagnostics.push(Diagnostic::NoSoftwareName {
                    target: target.to_owned(),
                });
            }
            name
        }
        None => {
            diagnostics.push(Diagnostic::NoSoftware {
                target: target.to_owned(),
            });
            None
        }
    }
}

/// Target of the root's `hasPart` reference.
pub fn find_data_entity<'a>(doc: &'a GraphDocument, root: &Node) -> Option<&'a Node> {
    doc.find_by_id(root.reference(PROP_DATA_ITEM)?)
}

/// Target of an entity's `creator` reference.
pub fn find_creator_of<'a>(doc: &'a GraphDocument, entity: &Node) -> Option<&'a Node> {
    doc.find_by_id(entity.reference(PROP_USER_ITEM)?)
}

fn owned(node: Option<&Node>, key: &str) -> Option<String> {
    node.and_then(|n| n.get_str(key)).map(str::to_owned)
}

/// Resolve root, software, data entity and creator in a single pass.
pub fn resolve(doc: &GraphDocument) -> Resolution {
    let mut diagnostics = Diagnostics::new();

    let root = find_root(doc);
    if root.is_none() {
        diagnostics.push(Diagnostic::NoRoot);
    }

    let software_name = find_software_name(doc, &mut diagnostics).map(str::to_owned);

    let data = root.and_then(|r| find_data_entity(doc, r));
    if data.is_none() {
        diagnostics.push(Diagnostic::NoData);
    }

    let creator = data
        .and_then(|d| find_creator_of(doc, d))
        .or_else(|| root.and_then(|r| find_creator_of(doc, r)));

    let content = ResolvedContent {
        root_id: owned(root, PROP_ID),
        root_type: owned(root, PROP_TYPE),
        software_name,
        creator_name: owned(creator, PROP_USER_NAME),
        object_type: owned(data, PROP_TYPE),
        object_name: owned(data, PROP_NAME),
        value: owned(data, PROP_VALUE),
    };
    if !diagnostics.is_empty() {
        log::info!("partially resolved crate: {diagnostics}");
    }
    Resolution {
        content,
        diagnostics,
    }
}
