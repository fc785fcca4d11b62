use std::collections::HashMap;

use log::{debug, info, warn};

use crate::{
    diff::{MappingBone, RemovedBone},
    error::FixError,
    host::BoneHost,
    target::TargetSkeleton,
};

use super::pending_names;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub removed: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreationOutcome {
    pub created: usize,
    pub passes: usize,
}

/// Destroy every removed bone not marked `keep`, moving its children up to
/// its parent first so their world placement survives.
pub fn remove_bones<H: BoneHost>(
    host: &mut H,
    source_bones: &[Option<H::Bone>],
    removed: &[RemovedBone],
) -> RemovalOutcome {
    let mut outcome = RemovalOutcome::default();
    for entry in removed {
        if entry.keep {
            debug!("Keeping removed bone {}", entry.name);
            outcome.kept += 1;
            continue;
        }
        let Some(bone) = source_bones.get(entry.source_index).copied().flatten() else {
            warn!("Removed bone {} has no node, skipped", entry.name);
            continue;
        };
        if !host.contains(bone) {
            warn!("Removed bone {} is already gone, skipped", entry.name);
            continue;
        }
        let parent = host.parent(bone);
        for child in host.children(bone) {
            host.set_parent(child, parent, true);
        }
        host.destroy_node(bone);
        debug!("Removed bone {}", entry.name);
        outcome.removed += 1;
    }
    outcome
}

/// Create a bone for every mapping row that has none, under the bone already
/// resolved for its model parent, with the model's local transform.
pub fn create_bones<H: BoneHost>(
    host: &mut H,
    target: &TargetSkeleton,
    mapping: &mut [MappingBone<H::Bone>],
) -> Result<CreationOutcome, FixError> {
    let mut resolved: HashMap<String, H::Bone> = mapping
        .iter()
        .filter_map(|row| row.bone.map(|bone| (row.name.clone(), bone)))
        .collect();
    let mut outcome = CreationOutcome::default();

    while mapping.iter().any(|row| row.bone.is_none()) {
        outcome.passes += 1;
        let mut progress = false;
        for (slot, row) in mapping.iter_mut().enumerate() {
            if row.bone.is_some() {
                continue;
            }
            let Some(target_bone) = target.bones().get(slot) else {
                continue;
            };
            let Some(parent) = target_bone
                .parent
                .as_deref()
                .and_then(|parent| resolved.get(parent))
                .copied()
            else {
                continue;
            };

            let bone = host.create_node(&row.name);
            host.set_parent(bone, Some(parent), false);
            host.set_local_transform(bone, target_bone.transform);
            row.bone = Some(bone);
            row.position_fix = false;
            resolved.insert(row.name.clone(), bone);
            debug!("Created bone {}", row.name);
            outcome.created += 1;
            progress = true;
        }
        if !progress {
            let unresolved_names = pending_names(mapping, |row| row.bone.is_none());
            warn!("Parent of bones cannot be resolved: {:?}", unresolved_names);
            return Err(FixError::UnresolvableParent { unresolved_names });
        }
    }

    if outcome.created > 0 {
        info!(
            "Created {} bones in {} passes",
            outcome.created, outcome.passes
        );
    }
    Ok(outcome)
}
