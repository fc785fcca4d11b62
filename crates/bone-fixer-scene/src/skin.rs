use std::fmt::{self, Display, Formatter};

use crate::node::NodeId;

/// Identity of the mesh a renderer draws. Two renderers can only share bones
/// when they skin the same mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshIndex(pub usize);

impl Display for MeshIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "mesh #{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RendererId(pub(crate) usize);

impl Display for RendererId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "renderer #{}", self.0)
    }
}

/// A mesh bound to a skeleton. Slot `i` of `bones` drives vertex group `i`.
#[derive(Debug, Clone)]
pub struct SkinnedMeshRenderer {
    pub name: Option<String>,
    pub mesh: MeshIndex,
    pub(crate) bones: Vec<Option<NodeId>>,
}

impl SkinnedMeshRenderer {
    pub fn new(name: Option<String>, mesh: MeshIndex, bones: Vec<Option<NodeId>>) -> Self {
        Self { name, mesh, bones }
    }

    pub fn bones(&self) -> &[Option<NodeId>] {
        &self.bones
    }
}
