use glam::{Mat4, Quat, Vec3};
use log::warn;

use crate::{
    node::{NodeId, SceneNode},
    skin::{RendererId, SkinnedMeshRenderer},
    transform::DecomposedTransform,
};

/// Node hierarchy plus the skinned mesh renderers bound to it.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. Destroyed
/// slots are left empty, so stale handles resolve to nothing instead of
/// aliasing a newer node.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
    renderers: Vec<SkinnedMeshRenderer>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root node with identity transform.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(SceneNode::new(name.into())));
        id
    }

    /// Create a node under `parent` with the given local transform.
    pub fn create_child(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        transform: DecomposedTransform,
    ) -> NodeId {
        let id = self.create_node(name);
        if let Some(parent) = parent {
            self.set_parent(id, Some(parent), false);
        }
        self.set_local_transform(id, transform);
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|node| node.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(SceneNode::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(SceneNode::children).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.as_ref().map(|node| (NodeId(index), node)))
    }

    /// First live node with the given name, in creation order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destroy a node together with its whole subtree.
    pub fn destroy_node(&mut self, id: NodeId) {
        if !self.contains(id) {
            warn!("Destroying non-existing node {}, no-op.", id);
            return;
        }
        self.detach(id);
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
                pending.extend(node.children);
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent) = self.node_mut(parent) {
            parent.children.retain(|child| *child != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Move `id` under `parent` (or to the root level when `None`), appending
    /// it to the new parent's children.
    ///
    /// With `keep_world` the local transform is recomputed so the world
    /// placement stays the same; otherwise the local transform is kept as is.
    /// When an ancestor carries non-uniform scale under a rotated child, the
    /// world matrix holds shear that translation, rotation and scale cannot
    /// express: the world position is still kept, the world rotation only
    /// approximately.
    ///
    /// Returns false when the move is refused.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>, keep_world: bool) -> bool {
        if !self.contains(id) {
            warn!("Reparenting non-existing node {}", id);
            return false;
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                warn!("Reparenting node {} to non-existing node {}", id, parent);
                return false;
            }
            if self.is_ancestor_or_self(id, parent) {
                warn!("Reparenting node {} under {} would create a cycle", id, parent);
                return false;
            }
        }

        let world = keep_world.then(|| self.world_matrix(id));
        self.detach(id);
        if let Some(parent) = parent {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.push(id);
            }
        }
        let parent_world = parent.map(|parent| self.world_matrix(parent));
        if let Some(node) = self.node_mut(id) {
            node.parent = parent;
            if let Some(world) = world {
                let local = match parent_world {
                    Some(parent_world) => parent_world.inverse() * world,
                    None => world,
                };
                node.transform = DecomposedTransform::from_matrix(local);
            }
        }
        true
    }

    pub fn local_transform(&self, id: NodeId) -> Option<&DecomposedTransform> {
        self.node(id).map(|node| &node.transform)
    }

    pub fn set_local_transform(&mut self, id: NodeId, transform: DecomposedTransform) {
        match self.node_mut(id) {
            Some(node) => node.transform = transform,
            None => warn!("Setting transform of non-existing node {}", id),
        }
    }

    /// Matrix from the node's local space to world space.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.node(id);
        while let Some(node) = current {
            matrix = node.transform.matrix() * matrix;
            current = node.parent.and_then(|parent| self.node(parent));
        }
        matrix
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// World rotation composed from local rotations only; scale along the
    /// chain never leaks into it.
    pub fn world_rotation(&self, id: NodeId) -> Quat {
        let mut rotation = Quat::IDENTITY;
        let mut current = self.node(id);
        while let Some(node) = current {
            rotation = node.transform.rotation * rotation;
            current = node.parent.and_then(|parent| self.node(parent));
        }
        rotation
    }

    /// Place a node in world space, keeping its local scale.
    pub fn set_world_position_rotation(&mut self, id: NodeId, position: Vec3, rotation: Quat) {
        let (translation, rotation) = match self.parent(id) {
            Some(parent) => (
                self.world_matrix(parent).inverse().transform_point3(position),
                (self.world_rotation(parent).inverse() * rotation).normalize(),
            ),
            None => (position, rotation),
        };
        match self.node_mut(id) {
            Some(node) => {
                node.transform.translation = translation;
                node.transform.rotation = rotation;
            }
            None => warn!("Placing non-existing node {}", id),
        }
    }

    pub fn add_renderer(&mut self, renderer: SkinnedMeshRenderer) -> RendererId {
        let id = RendererId(self.renderers.len());
        self.renderers.push(renderer);
        id
    }

    pub fn renderer(&self, id: RendererId) -> Option<&SkinnedMeshRenderer> {
        self.renderers.get(id.0)
    }

    /// Bone slots of a renderer. Slots pointing at destroyed nodes read as empty.
    pub fn bones(&self, id: RendererId) -> Vec<Option<NodeId>> {
        match self.renderer(id) {
            Some(renderer) => renderer
                .bones
                .iter()
                .map(|bone| bone.filter(|bone| self.contains(*bone)))
                .collect(),
            None => {
                warn!("Reading bones of non-existing {}", id);
                Vec::new()
            }
        }
    }

    /// Replace the whole bone array of a renderer at once.
    pub fn set_bones(&mut self, id: RendererId, bones: Vec<NodeId>) {
        match self.renderers.get_mut(id.0) {
            Some(renderer) => renderer.bones = bones.into_iter().map(Some).collect(),
            None => warn!("Setting bones of non-existing {}", id),
        }
    }

    pub fn same_mesh(&self, a: RendererId, b: RendererId) -> bool {
        match (self.renderer(a), self.renderer(b)) {
            (Some(a), Some(b)) => a.mesh == b.mesh,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use glam::{Quat, Vec3};

    use super::SceneGraph;
    use crate::{
        skin::{MeshIndex, SkinnedMeshRenderer},
        transform::DecomposedTransform,
    };

    fn same_rotation(a: Quat, b: Quat) -> bool {
        a.abs_diff_eq(b, 1e-5) || a.abs_diff_eq(-b, 1e-5)
    }

    fn chain() -> (SceneGraph, [crate::NodeId; 3]) {
        let mut scene = SceneGraph::new();
        let root = scene.create_child(
            "Root",
            None,
            DecomposedTransform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        );
        let hip = scene.create_child(
            "Hip",
            Some(root),
            DecomposedTransform {
                translation: Vec3::new(1.0, 0.0, 0.0),
                rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                scale: Vec3::ONE,
            },
        );
        let spine = scene.create_child(
            "Spine",
            Some(hip),
            DecomposedTransform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
        );
        (scene, [root, hip, spine])
    }

    #[test]
    fn test_world_transform() {
        let (scene, [_, hip, spine]) = chain();
        assert!(scene
            .world_position(hip)
            .abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
        // Hip rotates +X onto +Y
        assert!(scene
            .world_position(spine)
            .abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
        assert!(same_rotation(
            scene.world_rotation(spine),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)
        ));
    }

    #[test]
    fn test_reparent_keep_world() {
        let (mut scene, [root, _, spine]) = chain();
        let position = scene.world_position(spine);
        let rotation = scene.world_rotation(spine);
        assert!(scene.set_parent(spine, Some(root), true));
        assert_eq!(scene.parent(spine), Some(root));
        assert!(scene.world_position(spine).abs_diff_eq(position, 1e-5));
        assert!(same_rotation(scene.world_rotation(spine), rotation));
    }

    #[test]
    fn test_reparent_keep_world_under_non_uniform_scale() {
        let mut scene = SceneGraph::new();
        let root = scene.create_child(
            "Root",
            None,
            DecomposedTransform {
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: Vec3::new(2.0, 1.0, 1.0),
            },
        );
        let hip = scene.create_child(
            "Hip",
            Some(root),
            DecomposedTransform {
                translation: Vec3::new(0.5, 1.0, 0.0),
                rotation: Quat::from_rotation_z(0.8),
                scale: Vec3::ONE,
            },
        );
        let spine = scene.create_child(
            "Spine",
            Some(hip),
            DecomposedTransform::from_translation(Vec3::new(0.0, 0.7, 0.2)),
        );
        let position = scene.world_position(spine);
        assert!(scene.set_parent(spine, Some(root), true));
        assert_eq!(scene.parent(spine), Some(root));
        assert!(scene.world_position(spine).abs_diff_eq(position, 1e-5));
    }

    #[test]
    fn test_reparent_keep_local() {
        let (mut scene, [root, _, spine]) = chain();
        assert!(scene.set_parent(spine, Some(root), false));
        assert_eq!(
            scene.local_transform(spine).map(|t| t.translation),
            Some(Vec3::new(1.0, 0.0, 0.0))
        );
        assert!(scene
            .world_position(spine)
            .abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_reparent_refuses_cycle() {
        let (mut scene, [root, hip, spine]) = chain();
        assert!(!scene.set_parent(root, Some(spine), true));
        assert!(!scene.set_parent(hip, Some(hip), true));
        assert_eq!(scene.parent(root), None);
        assert_eq!(scene.children(root), &[hip]);
    }

    #[test]
    fn test_destroy_subtree() {
        let (mut scene, [root, hip, spine]) = chain();
        let renderer = scene.add_renderer(SkinnedMeshRenderer::new(
            None,
            MeshIndex(0),
            vec![Some(root), Some(hip), Some(spine)],
        ));
        scene.destroy_node(hip);
        assert!(!scene.contains(hip));
        assert!(!scene.contains(spine));
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.bones(renderer), vec![Some(root), None, None]);
        // handles are not reused
        let new = scene.create_node("Hip");
        assert_ne!(new, hip);
        assert_eq!(scene.find_by_name("Hip"), Some(new));
    }

    #[test]
    fn test_set_world_position_rotation() {
        let (mut scene, [_, hip, spine]) = chain();
        let target_position = Vec3::new(-2.0, 3.0, 0.5);
        let target_rotation = Quat::from_rotation_x(0.3);
        scene.set_world_position_rotation(spine, target_position, target_rotation);
        assert_eq!(scene.parent(spine), Some(hip));
        assert!(scene.world_position(spine).abs_diff_eq(target_position, 1e-5));
        assert!(same_rotation(scene.world_rotation(spine), target_rotation));
    }

    #[test]
    fn test_same_mesh() {
        let mut scene = SceneGraph::new();
        let a = scene.add_renderer(SkinnedMeshRenderer::new(None, MeshIndex(3), Vec::new()));
        let b = scene.add_renderer(SkinnedMeshRenderer::new(None, MeshIndex(3), Vec::new()));
        let c = scene.add_renderer(SkinnedMeshRenderer::new(None, MeshIndex(4), Vec::new()));
        assert!(scene.same_mesh(a, b));
        assert!(!scene.same_mesh(a, c));
    }
}
