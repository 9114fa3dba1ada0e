//! Read-only view over a node of a [`Document`].

use std::fmt;

use crate::document::{DependencyNode, Document, NodeIndex, NodeType, Resource};

/// A borrowed handle to one node of a document.
///
/// Navigation never fails: looking up a missing key, indexing past the end of
/// an array, or indexing into a scalar all yield the null view. Callers treat
/// "absent" and "explicit null" the same way.
#[derive(Clone, Copy)]
pub struct Value<'a> {
    document: &'a Document,
    index: NodeIndex,
}

impl<'a> Value<'a> {
    pub(crate) fn new(document: &'a Document, index: NodeIndex) -> Self {
        Self { document, index }
    }

    /// Tree index this view points at.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn node_type(&self) -> NodeType {
        self.document.node_type(self.index)
    }

    /// Returns `true` for null values and missing members alike.
    pub fn is_null(&self) -> bool {
        self.node_type() == NodeType::None
    }

    fn node(&self) -> Option<&'a DependencyNode> {
        self.document.node(self.index)
    }

    fn resource(&self) -> Option<&'a Resource> {
        self.node()
            .and_then(DependencyNode::resource_index)
            .and_then(|r| self.document.resource(r))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match (self.node()?, self.resource()?) {
            (DependencyNode::Boolean(_), Resource::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match (self.node()?, self.resource()?) {
            (DependencyNode::Integer(_), Resource::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number as a float; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match (self.node()?, self.resource()?) {
            (DependencyNode::Float(_), Resource::Float(f)) => Some(*f),
            (DependencyNode::Integer(_), Resource::Integer(n)) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match (self.node()?, self.resource()?) {
            (DependencyNode::String(_), Resource::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Child index for `key`, if this is an object that has it.
    pub fn lookup(&self, key: &str) -> Option<NodeIndex> {
        match self.node()? {
            DependencyNode::Object(members) => members.get(key),
            _ => None,
        }
    }

    /// Member `key` of an object, or the null view.
    pub fn get(&self, key: &str) -> Value<'a> {
        let index = self.lookup(key).unwrap_or(Document::NULL);
        Value::new(self.document, index)
    }

    /// Item `i` of an array, or the null view.
    pub fn at(&self, i: usize) -> Value<'a> {
        let index = match self.node() {
            Some(DependencyNode::Array(items)) => items.get(i).copied(),
            _ => None,
        };
        Value::new(self.document, index.unwrap_or(Document::NULL))
    }

    /// Number of array items or object members; zero for scalars.
    pub fn len(&self) -> usize {
        match self.node() {
            Some(DependencyNode::Array(items)) => items.len(),
            Some(DependencyNode::Object(members)) => members.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Array items in document order. Empty for anything but an array.
    pub fn items(&self) -> impl Iterator<Item = Value<'a>> + 'a {
        let document = self.document;
        let items: &'a [NodeIndex] = match self.node() {
            Some(DependencyNode::Array(items)) => items,
            _ => &[],
        };
        items.iter().map(move |&i| Value::new(document, i))
    }

    /// Object members in insertion order. Empty for anything but an object.
    pub fn entries(&self) -> Box<dyn Iterator<Item = (&'a str, Value<'a>)> + 'a> {
        let document = self.document;
        match self.node() {
            Some(DependencyNode::Object(members)) => {
                Box::new(members.iter().map(move |(k, i)| (k, Value::new(document, i))))
            }
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_type() {
            NodeType::None => write!(f, "null"),
            NodeType::Boolean => write!(f, "{}", self.as_bool().unwrap_or_default()),
            NodeType::Integer => write!(f, "{}", self.as_i64().unwrap_or_default()),
            NodeType::Float => {
                let n = self.as_f64().unwrap_or_default();
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n > 0.0 {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else {
                    write!(f, "{:?}", n)
                }
            }
            NodeType::String => write!(f, "{:?}", self.as_str().unwrap_or_default()),
            NodeType::Array => f.debug_list().entries(self.items()).finish(),
            NodeType::Object => f.debug_map().entries(self.entries()).finish(),
        }
    }
}

/// Structural equality: same shape and same scalars, regardless of where
/// the nodes live in their arenas.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        if self.node_type() != other.node_type() {
            return false;
        }
        match self.node_type() {
            NodeType::None => true,
            NodeType::Boolean => self.as_bool() == other.as_bool(),
            NodeType::Integer => self.as_i64() == other.as_i64(),
            NodeType::Float => self.as_f64() == other.as_f64(),
            NodeType::String => self.as_str() == other.as_str(),
            NodeType::Array => self.len() == other.len() && self.items().eq(other.items()),
            NodeType::Object => {
                self.len() == other.len()
                    && self
                        .entries()
                        .all(|(key, value)| other.lookup(key).is_some() && other.get(key) == value)
            }
        }
    }
}
