use std::{fmt::Debug, hash::Hash};

use bone_fixer_scene::{DecomposedTransform, NodeId, RendererId, SceneGraph};
use glam::{Quat, Vec3};

/// Scene primitives the repair runs against.
///
/// Bones and renderers are opaque handles owned by the host; the repair never
/// holds references into the host between calls.
pub trait BoneHost {
    type Bone: Copy + Eq + Hash + Debug;
    type Renderer: Copy + Debug;

    fn bones(&self, renderer: Self::Renderer) -> Vec<Option<Self::Bone>>;
    /// Replace the whole bone array at once.
    fn set_bones(&mut self, renderer: Self::Renderer, bones: Vec<Self::Bone>);
    fn same_mesh(&self, a: Self::Renderer, b: Self::Renderer) -> bool;

    fn contains(&self, bone: Self::Bone) -> bool;
    fn name(&self, bone: Self::Bone) -> Option<&str>;
    fn parent(&self, bone: Self::Bone) -> Option<Self::Bone>;
    fn children(&self, bone: Self::Bone) -> Vec<Self::Bone>;

    fn create_node(&mut self, name: &str) -> Self::Bone;
    fn destroy_node(&mut self, bone: Self::Bone);
    fn set_parent(&mut self, bone: Self::Bone, parent: Option<Self::Bone>, keep_world: bool);

    fn local_transform(&self, bone: Self::Bone) -> DecomposedTransform;
    fn set_local_transform(&mut self, bone: Self::Bone, transform: DecomposedTransform);
    fn world_transform(&self, bone: Self::Bone) -> (Vec3, Quat);
    fn set_world_transform(&mut self, bone: Self::Bone, position: Vec3, rotation: Quat);
}

impl BoneHost for SceneGraph {
    type Bone = NodeId;
    type Renderer = RendererId;

    fn bones(&self, renderer: RendererId) -> Vec<Option<NodeId>> {
        SceneGraph::bones(self, renderer)
    }

    fn set_bones(&mut self, renderer: RendererId, bones: Vec<NodeId>) {
        SceneGraph::set_bones(self, renderer, bones)
    }

    fn same_mesh(&self, a: RendererId, b: RendererId) -> bool {
        SceneGraph::same_mesh(self, a, b)
    }

    fn contains(&self, bone: NodeId) -> bool {
        SceneGraph::contains(self, bone)
    }

    fn name(&self, bone: NodeId) -> Option<&str> {
        SceneGraph::name(self, bone)
    }

    fn parent(&self, bone: NodeId) -> Option<NodeId> {
        SceneGraph::parent(self, bone)
    }

    fn children(&self, bone: NodeId) -> Vec<NodeId> {
        SceneGraph::children(self, bone).to_vec()
    }

    fn create_node(&mut self, name: &str) -> NodeId {
        SceneGraph::create_node(self, name)
    }

    fn destroy_node(&mut self, bone: NodeId) {
        SceneGraph::destroy_node(self, bone)
    }

    fn set_parent(&mut self, bone: NodeId, parent: Option<NodeId>, keep_world: bool) {
        SceneGraph::set_parent(self, bone, parent, keep_world);
    }

    fn local_transform(&self, bone: NodeId) -> DecomposedTransform {
        SceneGraph::local_transform(self, bone)
            .copied()
            .unwrap_or_default()
    }

    fn set_local_transform(&mut self, bone: NodeId, transform: DecomposedTransform) {
        SceneGraph::set_local_transform(self, bone, transform)
    }

    fn world_transform(&self, bone: NodeId) -> (Vec3, Quat) {
        (self.world_position(bone), self.world_rotation(bone))
    }

    fn set_world_transform(&mut self, bone: NodeId, position: Vec3, rotation: Quat) {
        self.set_world_position_rotation(bone, position, rotation)
    }
}
