use std::collections::HashSet;

use log::{debug, info};

use crate::{
    diff::{MappingBone, RemovedBone},
    error::FixError,
    finalize::finalize,
    host::BoneHost,
    index::{BoneIndex, BoneSetLabel},
    repair::{position::fix_positions, structure},
    target::TargetSkeleton,
};

/// What a successful [`reconcile`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixReport {
    /// Bone names and order already matched, nothing was touched.
    pub unchanged: bool,
    pub removed: usize,
    pub kept: usize,
    pub created: usize,
    pub position_fixed: usize,
    pub creation_passes: usize,
    pub position_fix_passes: usize,
}

/// Rebuild the bones of `broken` so they match `model`, following the
/// caller's annotations on `removed` and `mapping` (as produced by
/// [`diff`](crate::diff::diff) and possibly edited since).
///
/// Every input error is detected before the hierarchy is touched. Failures
/// inside the resolution loops ([`FixError::UnresolvableParent`],
/// [`FixError::PositionFixDeadlock`]) leave the edits made so far in place;
/// the bone array of `broken` is only written once everything succeeded.
pub fn reconcile<H: BoneHost>(
    host: &mut H,
    broken: H::Renderer,
    model: H::Renderer,
    removed: &[RemovedBone],
    mapping: &[MappingBone<H::Bone>],
) -> Result<FixReport, FixError> {
    if !host.same_mesh(broken, model) {
        return Err(FixError::MeshMismatch);
    }
    let source_bones = host.bones(broken);
    let source_index = BoneIndex::of_bones(host, &source_bones, BoneSetLabel::Broken)?;
    let target = TargetSkeleton::capture(host, model)?;
    if mapping.len() != target.len() {
        return Err(FixError::MappingLengthMismatch {
            expected: target.len(),
            actual: mapping.len(),
        });
    }

    if source_bones.len() == target.len()
        && source_index == *target.index()
        && mapping
            .iter()
            .all(|row| !row.changed() && !row.position_fix)
    {
        info!("Bones already match the model, nothing to fix");
        return Ok(FixReport {
            unchanged: true,
            ..FixReport::default()
        });
    }

    let destroyed = validate(host, &source_bones, &target, removed, mapping)?;
    debug!(
        "Fixing {} bones against {} model bones, {} to destroy",
        source_bones.len(),
        target.len(),
        destroyed
    );

    let mut mapping = mapping.to_vec();
    let removal = structure::remove_bones(host, &source_bones, removed);
    let creation = structure::create_bones(host, &target, &mut mapping)?;
    let position = fix_positions(host, &target, &mut mapping)?;
    finalize(host, broken, &mapping)?;

    let report = FixReport {
        unchanged: false,
        removed: removal.removed,
        kept: removal.kept,
        created: creation.created,
        position_fixed: position.fixed(),
        creation_passes: creation.passes,
        position_fix_passes: position.passes,
    };
    info!("Fixing bones succeed: {:?}", report);
    Ok(report)
}

/// Reject annotations that cannot be applied. Returns how many bones the
/// removal step will destroy.
fn validate<H: BoneHost>(
    host: &H,
    source_bones: &[Option<H::Bone>],
    target: &TargetSkeleton,
    removed: &[RemovedBone],
    mapping: &[MappingBone<H::Bone>],
) -> Result<usize, FixError> {
    let mut destroyed = HashSet::new();
    for entry in removed {
        let bone = source_bones.get(entry.source_index).copied().flatten();
        let matches = bone.is_some_and(|bone| host.name(bone) == Some(entry.name.as_str()));
        if !matches {
            return Err(FixError::StaleBone {
                name: entry.name.clone(),
            });
        }
        if let (Some(bone), false) = (bone, entry.keep) {
            destroyed.insert(bone);
        }
    }

    let mut mapped = HashSet::new();
    for (slot, row) in mapping.iter().enumerate() {
        let Some(bone) = row.bone else {
            continue;
        };
        if !host.contains(bone) {
            return Err(FixError::StaleBone {
                name: row.name.clone(),
            });
        }
        if destroyed.contains(&bone) {
            return Err(FixError::MappedBoneRemoved {
                name: row.name.clone(),
            });
        }
        if !mapped.insert(bone) {
            return Err(FixError::DuplicateMappedBone {
                name: row.name.clone(),
            });
        }
        if row.position_fix && target.parent_slot(slot).is_none() {
            return Err(FixError::PositionFixOnRoot {
                name: row.name.clone(),
            });
        }
    }
    Ok(destroyed.len())
}
