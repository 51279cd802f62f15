//! Flat, id-referenced JSON-LD graph as used by RO-Crate metadata files.
//!
//! Nodes are kept as raw JSON objects so that unknown properties survive a
//! read and so that malformed links can be tolerated instead of rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `@id` of the root data entity.
pub const ROOT_ID: &str = "./";

/// File name of the metadata document inside a crate.
pub const METADATA_FILE: &str = "ro-crate-metadata.json";

/// Link to another node in the same document, `{"@id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "@id")]
    pub id: String,
}

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl From<&str> for Reference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single entry of `@graph`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(Map<String, Value>);

impl Node {
    /// Build a node from any value which serializes to a JSON object.
    pub fn from_serializable<T: Serialize>(value: &T) -> crate::Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| crate::Error::general(format!("could not serialize node: {e}")))?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(crate::Error::general(format!(
                "graph node must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("@id")
    }

    /// Whether `@type` is, or contains, the given type name.
    pub fn has_type(&self, type_name: &str) -> bool {
        match self.0.get("@type") {
            Some(Value::String(s)) => s == type_name,
            Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(type_name)),
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of a property; `None` if absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Target `@id` of the reference stored under `key`.
    ///
    /// Accepts a single reference object or an array of them, in which case
    /// the first one carrying an `@id` is used.
    pub fn reference(&self, key: &str) -> Option<&str> {
        fn ref_id(value: &Value) -> Option<&str> {
            value.as_object()?.get("@id")?.as_str()
        }

        match self.0.get(key)? {
            Value::Array(items) => items.iter().find_map(ref_id),
            value => ref_id(value),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

/// A whole metadata document: one shared context and an ordered node list.
///
/// Insertion order of `graph` is preserved on output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(rename = "@context", default)]
    pub context: Value,
    #[serde(rename = "@graph", default, deserialize_with = "object_nodes")]
    pub graph: Vec<Node>,
}

impl GraphDocument {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: Value::String(context.into()),
            graph: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.graph.push(node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// The context, if it is a plain URI string.
    pub fn context_uri(&self) -> Option<&str> {
        self.context.as_str()
    }

    /// First node whose `@id` equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.graph.iter().find(|n| n.id() == Some(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.graph.iter_mut().find(|n| n.id() == Some(id))
    }

    /// All nodes carrying the given `@type`, in document order.
    pub fn find_by_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.graph.iter().filter(move |n| n.has_type(type_name))
    }
}

/// Keep object entries of `@graph` and drop anything else.
fn object_nodes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Node>, D::Error> {
    let entries = Vec::<Value>::deserialize(deserializer)?;
    let mut nodes = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::Object(map) => nodes.push(Node(map)),
            other => log::warn!("skipping non-object @graph entry {idx}: {other}"),
        }
    }
    Ok(nodes)
}
