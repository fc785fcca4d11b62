use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use glam::{Mat4, Quat, Vec3};
use gltf::{scene::Transform, Document, Gltf, Node};
use log::debug;

use crate::{
    node::NodeId,
    scene::SceneGraph,
    skin::{MeshIndex, RendererId, SkinnedMeshRenderer},
    transform::{DecomposedTransform, MatrixNodeTransform, NodeTransform},
};

#[derive(Debug)]
pub enum GltfLoaderError {
    Gltf(gltf::Error),
    BadNodeIndex(usize),
}

impl Display for GltfLoaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GltfLoaderError::Gltf(error) => Display::fmt(error, f),
            GltfLoaderError::BadNodeIndex(index) => write!(f, "Bad node index: {}", index),
        }
    }
}

impl From<gltf::Error> for GltfLoaderError {
    fn from(value: gltf::Error) -> Self {
        Self::Gltf(value)
    }
}

impl Error for GltfLoaderError {}

/// A scene built from a glTF document.
#[derive(Debug, Clone)]
pub struct GltfScene {
    pub scene: SceneGraph,
    /// One renderer per node carrying both a mesh and a skin, in node order.
    pub renderers: Vec<RendererId>,
}

impl GltfScene {
    pub fn renderer_by_name(&self, name: &str) -> Option<RendererId> {
        self.renderers.iter().copied().find(|id| {
            self.scene
                .renderer(*id)
                .and_then(|renderer| renderer.name.as_deref())
                == Some(name)
        })
    }
}

struct GltfDocumentLoader<'a> {
    document: &'a Document,
    scene: SceneGraph,
    // gltf node index -> scene node
    node_ids: Vec<NodeId>,
}

impl<'a> GltfDocumentLoader<'a> {
    fn new(document: &'a Document) -> Self {
        Self {
            document,
            scene: SceneGraph::new(),
            node_ids: Vec::new(),
        }
    }

    fn node_name(node: &Node) -> String {
        node.name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()))
    }

    fn load_transform(node: &Node) -> DecomposedTransform {
        let transform = match node.transform() {
            Transform::Matrix { matrix } => {
                NodeTransform::Matrix(MatrixNodeTransform(Mat4::from_cols_array_2d(&matrix)))
            }
            Transform::Decomposed {
                translation,
                rotation,
                scale,
            } => NodeTransform::Decomposed(DecomposedTransform {
                translation: Vec3::from_array(translation),
                rotation: Quat::from_array(rotation),
                scale: Vec3::from_array(scale),
            }),
        };
        transform.into()
    }

    fn node_id(&self, index: usize) -> Result<NodeId, GltfLoaderError> {
        self.node_ids
            .get(index)
            .copied()
            .ok_or(GltfLoaderError::BadNodeIndex(index))
    }

    fn load_nodes(&mut self) -> Result<(), GltfLoaderError> {
        for node in self.document.nodes() {
            let id = self.scene.create_node(Self::node_name(&node));
            self.scene
                .set_local_transform(id, Self::load_transform(&node));
            self.node_ids.push(id);
        }
        for node in self.document.nodes() {
            let parent = self.node_id(node.index())?;
            for child in node.children() {
                let child = self.node_id(child.index())?;
                self.scene.set_parent(child, Some(parent), false);
            }
        }
        Ok(())
    }

    fn load_renderers(&mut self) -> Result<Vec<RendererId>, GltfLoaderError> {
        let mut renderers = Vec::new();
        for node in self.document.nodes() {
            let (Some(mesh), Some(skin)) = (node.mesh(), node.skin()) else {
                continue;
            };
            let bones = skin
                .joints()
                .map(|joint| self.node_id(joint.index()).map(Some))
                .collect::<Result<Vec<_>, _>>()?;
            let mesh = MeshIndex(mesh.index());
            debug!(
                "Skinned mesh {} with {} bones on {}",
                Self::node_name(&node),
                bones.len(),
                mesh
            );
            renderers.push(self.scene.add_renderer(SkinnedMeshRenderer::new(
                node.name().map(str::to_string),
                mesh,
                bones,
            )));
        }
        Ok(renderers)
    }

    fn load(mut self) -> Result<GltfScene, GltfLoaderError> {
        self.load_nodes()?;
        let renderers = self.load_renderers()?;
        Ok(GltfScene {
            scene: self.scene,
            renderers,
        })
    }
}

/// Load nodes and skinned meshes from a glTF JSON or GLB buffer.
///
/// Buffers are never read, only the document structure is needed.
pub fn load_gltf_from_buffer(buffer: &[u8]) -> Result<GltfScene, GltfLoaderError> {
    let gltf = Gltf::from_slice(buffer)?;
    GltfDocumentLoader::new(&gltf.document).load()
}
