/// Skeleton loader with `gltf` crate.
#[cfg(feature = "gltf")]
pub mod gltf;
