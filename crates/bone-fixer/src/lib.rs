//! Repair a skinned mesh whose skeleton went out of date.
//!
//! Given a *broken* renderer and a *model* renderer skinning the same mesh,
//! [`diff()`] matches their bones by name, and [`reconcile`] edits the broken
//! hierarchy in place: bones missing from the model are removed (their
//! children moved up), bones missing from the broken skeleton are created
//! under their resolved parent, flagged bones are moved to where the model
//! places them, and the bone array is rewritten in model order.
//!
//! The host scene is reached only through [`BoneHost`], which is implemented
//! for [`bone_fixer_scene::SceneGraph`].
//!
pub mod diff;
pub mod error;
pub mod finalize;
pub mod fixer;
pub mod host;
pub mod index;
pub mod repair;
pub mod target;

pub use bone_fixer_scene as scene;
pub use diff::{diff, BoneDiff, MappingBone, RemovedBone};
pub use error::FixError;
pub use fixer::{reconcile, FixReport};
pub use host::BoneHost;
pub use index::{BoneIndex, BoneSetLabel};
pub use target::{TargetBone, TargetSkeleton};
