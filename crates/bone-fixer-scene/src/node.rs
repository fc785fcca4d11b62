use std::fmt::{self, Display, Formatter};

use crate::transform::DecomposedTransform;

/// Handle of a node in a [`SceneGraph`](crate::scene::SceneGraph).
///
/// Handles are never reused, so a handle to a destroyed node stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: DecomposedTransform,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            transform: DecomposedTransform::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
