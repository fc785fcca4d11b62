//! Scene model for skeleton repair.
//!
//! This library provides an arena backed node hierarchy with local
//! transforms, world transform queries derived from the parent chain, and
//! skinned mesh renderers whose ordered bone slots point into the hierarchy.
//! With the `gltf` feature, a whole scene can be built from a glTF asset.
//!
pub mod loader;
pub mod node;
pub mod scene;
pub mod skin;
pub mod transform;

pub use node::NodeId;
pub use scene::SceneGraph;
pub use skin::{MeshIndex, RendererId, SkinnedMeshRenderer};
pub use transform::DecomposedTransform;
