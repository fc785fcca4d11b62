use log::debug;

use crate::{
    error::FixError,
    host::BoneHost,
    index::{BoneIndex, BoneSetLabel},
    target::TargetSkeleton,
};

/// A broken bone whose name is absent from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemovedBone {
    pub name: String,
    /// Slot of the bone in the broken bone set.
    pub source_index: usize,
    /// Leave the node in the hierarchy instead of destroying it.
    pub keep: bool,
}

/// One row per model bone: which broken bone will fill that slot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappingBone<B> {
    pub name: String,
    /// `None` until a bone is created for this slot. May be pointed at any
    /// other broken bone by the caller.
    pub bone: Option<B>,
    /// Overwrite the bone's transform from the model.
    pub position_fix: bool,
    original_bone: Option<B>,
}

impl<B: Copy + PartialEq> MappingBone<B> {
    pub fn new(name: impl Into<String>, bone: Option<B>) -> Self {
        Self {
            name: name.into(),
            bone,
            position_fix: bone.is_none(),
            original_bone: bone,
        }
    }

    /// The bone matched by name when the diff was computed.
    pub fn original_bone(&self) -> Option<B> {
        self.original_bone
    }

    pub fn changed(&self) -> bool {
        self.bone != self.original_bone
    }

    pub fn is_added(&self) -> bool {
        self.original_bone.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneDiff<B> {
    /// Sorted by name.
    pub removed: Vec<RemovedBone>,
    /// In model bone order.
    pub mapping: Vec<MappingBone<B>>,
}

impl<B: Copy + PartialEq> BoneDiff<B> {
    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.mapping
            .iter()
            .filter(|row| row.is_added())
            .map(|row| row.name.as_str())
    }

    pub fn is_identical(&self) -> bool {
        self.removed.is_empty()
            && self
                .mapping
                .iter()
                .all(|row| !row.is_added() && !row.changed() && !row.position_fix)
    }
}

/// Match broken bones to model bones by name.
///
/// Pure: nothing in the host is touched, so this can be recomputed whenever
/// the selection changes.
pub fn diff<H: BoneHost>(
    host: &H,
    broken: H::Renderer,
    model: H::Renderer,
) -> Result<BoneDiff<H::Bone>, FixError> {
    let source_bones = host.bones(broken);
    let source_index = BoneIndex::of_bones(host, &source_bones, BoneSetLabel::Broken)?;
    let target = TargetSkeleton::capture(host, model)?;
    let diff = diff_bones(&source_bones, &source_index, &target);
    debug!(
        "Diff: {} removed, {} added, {} mapped",
        diff.removed.len(),
        diff.added().count(),
        diff.mapping.len()
    );
    Ok(diff)
}

pub(crate) fn diff_bones<B: Copy + PartialEq>(
    source_bones: &[Option<B>],
    source_index: &BoneIndex,
    target: &TargetSkeleton,
) -> BoneDiff<B> {
    let mut removed: Vec<RemovedBone> = source_index
        .iter()
        .filter(|(name, _)| !target.index().contains(name))
        .map(|(name, source_index)| RemovedBone {
            name: name.to_string(),
            source_index,
            keep: false,
        })
        .collect();
    removed.sort_by(|a, b| a.name.cmp(&b.name));

    let mapping = target
        .bones()
        .iter()
        .map(|bone| {
            let matched = source_index
                .get(&bone.name)
                .and_then(|index| source_bones.get(index).copied().flatten());
            MappingBone::new(bone.name.clone(), matched)
        })
        .collect();

    BoneDiff { removed, mapping }
}
