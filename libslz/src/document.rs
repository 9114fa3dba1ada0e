//! The shared intermediate representation both front ends build.
//!
//! A [`Document`] is an arena: one growable vector owns every node, and
//! structure is expressed with plain indices into it. Scalars do not hold
//! their data inline; they point into a parallel resource table.
//!
//! The first three slots of both vectors are reserved when the document is
//! created:
//!
//! | index | tree node          | resource          |
//! |-------|--------------------|-------------------|
//! | 0     | `None(0)`          | `Empty`           |
//! | 1     | `Boolean(1)`       | `Boolean(false)`  |
//! | 2     | `Boolean(2)`       | `Boolean(true)`   |
//!
//! The first node produced by a parse lands at [`Document::ROOT`].

use std::collections::HashMap;
use std::fmt;

use crate::value::Value;

/// Index into [`Document::dependency_tree`].
pub type NodeIndex = usize;

/// Index into [`Document::resources`].
pub type ResourceIndex = usize;

/// A scalar payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// Placeholder paired with the null node.
    Empty,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

/// The variant of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    None,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl NodeType {
    /// Upper-case name used in diagnostics and dumps.
    pub fn name(self) -> &'static str {
        match self {
            NodeType::None => "NONE",
            NodeType::Boolean => "BOOLEAN",
            NodeType::Integer => "INTEGER",
            NodeType::Float => "FLOAT",
            NodeType::String => "STRING",
            NodeType::Array => "ARRAY",
            NodeType::Object => "OBJECT",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyNode {
    /// Slot reserved before its content was seen. Never survives a parse.
    Pending,
    None(ResourceIndex),
    Boolean(ResourceIndex),
    Integer(ResourceIndex),
    Float(ResourceIndex),
    String(ResourceIndex),
    Array(Vec<NodeIndex>),
    Object(ObjectNode),
}

impl DependencyNode {
    pub fn node_type(&self) -> NodeType {
        match self {
            DependencyNode::Pending | DependencyNode::None(_) => NodeType::None,
            DependencyNode::Boolean(_) => NodeType::Boolean,
            DependencyNode::Integer(_) => NodeType::Integer,
            DependencyNode::Float(_) => NodeType::Float,
            DependencyNode::String(_) => NodeType::String,
            DependencyNode::Array(_) => NodeType::Array,
            DependencyNode::Object(_) => NodeType::Object,
        }
    }

    /// The resource slot of a scalar node.
    pub fn resource_index(&self) -> Option<ResourceIndex> {
        match self {
            DependencyNode::None(r)
            | DependencyNode::Boolean(r)
            | DependencyNode::Integer(r)
            | DependencyNode::Float(r)
            | DependencyNode::String(r) => Some(*r),
            _ => None,
        }
    }
}

/// Object members in insertion order, with keyed lookup.
///
/// Inserting a key that is already present replaces its child index and
/// keeps the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectNode {
    members: Vec<(String, NodeIndex)>,
    positions: HashMap<String, usize>,
}

impl ObjectNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, child: NodeIndex) {
        match self.positions.get(&key) {
            Some(&position) => self.members[position].1 = child,
            None => {
                self.positions.insert(key.clone(), self.members.len());
                self.members.push((key, child));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<NodeIndex> {
        self.positions.get(key).map(|&p| self.members[p].1)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeIndex)> {
        self.members.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Parsed document: a flat dependency tree plus its resource table.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    dependency_tree: Vec<DependencyNode>,
    resources: Vec<Resource>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// The reserved null node, also the target of every missing lookup.
    pub const NULL: NodeIndex = 0;
    /// The reserved `false` node.
    pub const FALSE: NodeIndex = 1;
    /// The reserved `true` node.
    pub const TRUE: NodeIndex = 2;
    /// The first node a parse produces.
    pub const ROOT: NodeIndex = 3;

    /// Create a document holding only the reserved header entries.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty document sized for `len` bytes of source text.
    pub fn with_source_len(len: usize) -> Self {
        Self::with_capacity(len / 10)
    }

    fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(Self::ROOT + 1);
        let mut dependency_tree = Vec::with_capacity(capacity);
        let mut resources = Vec::with_capacity(capacity);

        dependency_tree.push(DependencyNode::None(Self::NULL));
        resources.push(Resource::Empty);

        dependency_tree.push(DependencyNode::Boolean(Self::FALSE));
        resources.push(Resource::Boolean(false));

        dependency_tree.push(DependencyNode::Boolean(Self::TRUE));
        resources.push(Resource::Boolean(true));

        Self {
            dependency_tree,
            resources,
        }
    }

    pub fn dependency_tree(&self) -> &[DependencyNode] {
        &self.dependency_tree
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn node(&self, index: NodeIndex) -> Option<&DependencyNode> {
        self.dependency_tree.get(index)
    }

    pub fn resource(&self, index: ResourceIndex) -> Option<&Resource> {
        self.resources.get(index)
    }

    /// Variant of the node at `index`; out-of-range indices read as `None`.
    pub fn node_type(&self, index: NodeIndex) -> NodeType {
        self.node(index)
            .map(DependencyNode::node_type)
            .unwrap_or(NodeType::None)
    }

    /// Whether a parse produced any node beyond the reserved header.
    pub fn has_root(&self) -> bool {
        self.dependency_tree.len() > Self::ROOT
    }

    /// View of the logical document root.
    pub fn root(&self) -> Value<'_> {
        if self.has_root() {
            self.value(Self::ROOT)
        } else {
            self.value(Self::NULL)
        }
    }

    /// View of the node at `index`.
    pub fn value(&self, index: NodeIndex) -> Value<'_> {
        Value::new(self, index)
    }

    // ------------------------------------------------------------------
    // Construction, used by the front ends.
    // ------------------------------------------------------------------

    /// Append a pending slot and return its index.
    pub(crate) fn reserve(&mut self) -> NodeIndex {
        self.dependency_tree.push(DependencyNode::Pending);
        self.dependency_tree.len() - 1
    }

    fn push_resource(&mut self, resource: Resource) -> ResourceIndex {
        self.resources.push(resource);
        self.resources.len() - 1
    }

    pub(crate) fn set_string(&mut self, node: NodeIndex, value: String) {
        let resource = self.push_resource(Resource::String(value));
        self.dependency_tree[node] = DependencyNode::String(resource);
    }

    pub(crate) fn set_integer(&mut self, node: NodeIndex, value: i64) {
        let resource = self.push_resource(Resource::Integer(value));
        self.dependency_tree[node] = DependencyNode::Integer(resource);
    }

    pub(crate) fn set_float(&mut self, node: NodeIndex, value: f64) {
        let resource = self.push_resource(Resource::Float(value));
        self.dependency_tree[node] = DependencyNode::Float(resource);
    }

    /// Point `node` at one of the reserved null/false/true resources.
    pub(crate) fn set_singleton(&mut self, node: NodeIndex, singleton: NodeIndex) {
        self.dependency_tree[node] = match singleton {
            Self::FALSE => DependencyNode::Boolean(Self::FALSE),
            Self::TRUE => DependencyNode::Boolean(Self::TRUE),
            _ => DependencyNode::None(Self::NULL),
        };
    }

    pub(crate) fn begin_array(&mut self, node: NodeIndex) {
        self.dependency_tree[node] = DependencyNode::Array(Vec::new());
    }

    pub(crate) fn begin_object(&mut self, node: NodeIndex) {
        self.dependency_tree[node] = DependencyNode::Object(ObjectNode::new());
    }

    pub(crate) fn push_item(&mut self, array: NodeIndex, child: NodeIndex) {
        if let DependencyNode::Array(items) = &mut self.dependency_tree[array] {
            items.push(child);
        }
    }

    pub(crate) fn insert_member(&mut self, object: NodeIndex, key: String, child: NodeIndex) {
        if let DependencyNode::Object(members) = &mut self.dependency_tree[object] {
            members.insert(key, child);
        }
    }

    /// Resolve a slot that is still pending to null.
    pub(crate) fn settle(&mut self, node: NodeIndex) {
        if let DependencyNode::Pending = self.dependency_tree[node] {
            self.dependency_tree[node] = DependencyNode::None(Self::NULL);
        }
    }
}
