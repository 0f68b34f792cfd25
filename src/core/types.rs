//! Data model for compiled workflow trees, configuration, and context propagation.
//!
//! Every type derives Serialize/Deserialize so trees and configs can be
//! round-tripped through YAML or JSON. Maps preserve insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};

/// Root-to-node sequence of step names.
pub type Namespaces = Vec<String>;

/// Named collection of search-path lists (namespace name → paths).
pub type SearchPaths = IndexMap<String, Vec<String>>;

// ============================================================================
// Compiled workflow tree
// ============================================================================

/// The data attached to one node of a compiled workflow tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Position of this node from the root (empty for the root itself)
    #[serde(default)]
    pub namespaces: Namespaces,

    /// Unqualified identifier used as the output file stem
    pub stem: String,

    /// Fully compiled workflow document (opaque to this crate)
    pub compiled: Value,

    /// Default inputs collected during compilation. Only complete at the root.
    #[serde(default)]
    pub default_inputs: Mapping,
}

impl NodeData {
    pub fn new(namespaces: Namespaces, stem: impl Into<String>, compiled: Value) -> Self {
        Self {
            namespaces,
            stem: stem.into(),
            compiled,
            default_inputs: Mapping::new(),
        }
    }

    /// Builder-style setter for the default inputs document.
    pub fn with_default_inputs(mut self, default_inputs: Mapping) -> Self {
        self.default_inputs = default_inputs;
        self
    }

    /// The step name this node was invoked under in its parent.
    ///
    /// Falls back to the stem for a root node, which has no namespace.
    pub fn step_name(&self) -> &str {
        self.namespaces
            .last()
            .map(String::as_str)
            .unwrap_or(&self.stem)
    }
}

/// A rooted tree of compiled workflows; children are nested subworkflow steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledTree {
    pub data: NodeData,

    #[serde(default)]
    pub children: Vec<CompiledTree>,
}

impl CompiledTree {
    pub fn leaf(data: NodeData) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: CompiledTree) -> Self {
        self.children.push(child);
        self
    }

    /// Pre-order iterator over every node's data, root first.
    pub fn iter(&self) -> impl Iterator<Item = &NodeData> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(&node.data)
        })
    }

    /// Total number of nodes in the tree.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(CompiledTree::len).sum::<usize>()
    }

    /// A tree always has a root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

// ============================================================================
// Global configuration
// ============================================================================

/// Persisted configuration object. Search-path categories are absolute once
/// returned by the config store; any other top-level keys pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Search paths for tool (CommandLineTool) definitions
    #[serde(default)]
    pub search_paths_cwl: SearchPaths,

    /// Search paths for workflow definitions
    #[serde(default)]
    pub search_paths_wic: SearchPaths,

    /// Unrecognized keys, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// Context propagation
// ============================================================================

/// Key of the single-entry mapping that marks a value as supplied inline.
pub const INLINE_INPUT_KEY: &str = "wic_inline_input";

/// Wrap a value as an inline input: `{wic_inline_input: <value>}`.
pub fn inline_input(value: impl Into<Value>) -> Value {
    let mut marker = Mapping::new();
    marker.insert(Value::String(INLINE_INPUT_KEY.to_string()), value.into());
    Value::Mapping(marker)
}

/// Unwrap an inline-input marker, if `value` is one.
pub fn as_inline_input(value: &Value) -> Option<&Value> {
    let mapping = value.as_mapping()?;
    if mapping.len() != 1 {
        return None;
    }
    mapping.get(INLINE_INPUT_KEY)
}

/// Where an explicit edge call was made and under which argument name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCall {
    pub namespaces: Namespaces,
    pub arg_key: String,
}

/// Ledger of explicit edge calls made during one compilation run.
///
/// Entries are only ever added. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeCallLedger {
    entries: IndexMap<String, EdgeCall>,
}

impl EdgeCallLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edge call, replacing any previous entry with the same name.
    pub fn record(&mut self, name: impl Into<String>, call: EdgeCall) -> Option<EdgeCall> {
        self.entries.insert(name.into(), call)
    }

    pub fn get(&self, name: &str) -> Option<&EdgeCall> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EdgeCall)> {
        self.entries.iter()
    }
}
