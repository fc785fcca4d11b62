use bone_fixer_scene::DecomposedTransform;
use log::{debug, info, warn};

use crate::{diff::MappingBone, error::FixError, host::BoneHost, target::TargetSkeleton};

use super::pending_names;

const PROBE_NAME: &str = "__bone_fixer_probe";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionFixOutcome {
    /// Bones whose parent already matched; local transform copied.
    pub fast: usize,
    /// Bones placed in world space through a probe node.
    pub general: usize,
    pub passes: usize,
}

impl PositionFixOutcome {
    pub fn fixed(&self) -> usize {
        self.fast + self.general
    }
}

/// Make every row flagged `position_fix` sit where the model puts it,
/// relative to the bone resolved for its model parent.
///
/// A row waits until its parent row is no longer flagged, so parents are
/// always placed before their children.
pub fn fix_positions<H: BoneHost>(
    host: &mut H,
    target: &TargetSkeleton,
    mapping: &mut [MappingBone<H::Bone>],
) -> Result<PositionFixOutcome, FixError> {
    let mut outcome = PositionFixOutcome::default();

    while mapping.iter().any(|row| row.position_fix) {
        outcome.passes += 1;
        let mut progress = false;
        for slot in 0..mapping.len() {
            if !mapping[slot].position_fix {
                continue;
            }
            let Some(parent_slot) = target.parent_slot(slot) else {
                return Err(FixError::PositionFixOnRoot {
                    name: mapping[slot].name.clone(),
                });
            };
            if mapping[parent_slot].position_fix {
                continue;
            }

            let row = &mapping[slot];
            let bone = row.bone.ok_or_else(|| FixError::StaleBone {
                name: row.name.clone(),
            })?;
            let parent = mapping[parent_slot]
                .bone
                .ok_or_else(|| FixError::StaleBone {
                    name: mapping[parent_slot].name.clone(),
                })?;
            let Some(target_bone) = target.bones().get(slot) else {
                continue;
            };
            let source = target_bone.transform;

            if host.parent(bone) == Some(parent) {
                let mut transform = host.local_transform(bone);
                transform.translation = source.translation;
                transform.rotation = source.rotation;
                host.set_local_transform(bone, transform);
                debug!("Fixed position of {} locally", row.name);
                outcome.fast += 1;
            } else {
                let probe = host.create_node(PROBE_NAME);
                host.set_parent(probe, Some(parent), false);
                host.set_local_transform(
                    probe,
                    DecomposedTransform::from_translation_rotation(
                        source.translation,
                        source.rotation,
                    ),
                );
                let (position, rotation) = host.world_transform(probe);
                host.destroy_node(probe);
                host.set_world_transform(bone, position, rotation);
                debug!("Fixed position of {} in world space", row.name);
                outcome.general += 1;
            }

            mapping[slot].position_fix = false;
            progress = true;
        }
        if !progress {
            let unresolved_names = pending_names(mapping, |row| row.position_fix);
            warn!("Position of bones cannot be fixed: {:?}", unresolved_names);
            return Err(FixError::PositionFixDeadlock { unresolved_names });
        }
    }

    if outcome.fixed() > 0 {
        info!(
            "Fixed position of {} bones ({} local, {} world) in {} passes",
            outcome.fixed(),
            outcome.fast,
            outcome.general,
            outcome.passes
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use bone_fixer_scene::{DecomposedTransform, SceneGraph};
    use glam::{Quat, Vec3};

    use super::fix_positions;
    use crate::{
        diff::MappingBone,
        error::FixError,
        target::{TargetBone, TargetSkeleton},
    };

    fn bone(name: &str, parent: Option<&str>, transform: DecomposedTransform) -> TargetBone {
        TargetBone {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            transform,
        }
    }

    fn flagged<B: Copy + PartialEq>(name: &str, bone: B) -> MappingBone<B> {
        let mut row = MappingBone::new(name, Some(bone));
        row.position_fix = true;
        row
    }

    #[test]
    fn test_fast_path_keeps_scale() {
        let mut scene = SceneGraph::new();
        let root = scene.create_node("Root");
        let hip = scene.create_child(
            "Hip",
            Some(root),
            DecomposedTransform {
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: Vec3::splat(3.0),
            },
        );
        let wanted = DecomposedTransform {
            translation: Vec3::new(0.1, 0.2, 0.3),
            rotation: Quat::from_rotation_y(0.7),
            scale: Vec3::ONE,
        };
        let target = TargetSkeleton::from_bones(vec![
            bone("Root", None, DecomposedTransform::IDENTITY),
            bone("Hip", Some("Root"), wanted),
        ])
        .unwrap();
        let mut mapping = vec![MappingBone::new("Root", Some(root)), flagged("Hip", hip)];

        let outcome = fix_positions(&mut scene, &target, &mut mapping).unwrap();
        assert_eq!((outcome.fast, outcome.general), (1, 0));
        let transform = scene.local_transform(hip).unwrap();
        assert_eq!(transform.translation, wanted.translation);
        assert_eq!(transform.rotation, wanted.rotation);
        assert_eq!(transform.scale, Vec3::splat(3.0));
        assert!(!mapping[1].position_fix);
    }

    #[test]
    fn test_general_path_leaves_no_probe() {
        let mut scene = SceneGraph::new();
        let root = scene.create_node("Root");
        let other = scene.create_child(
            "Other",
            Some(root),
            DecomposedTransform::from_translation(Vec3::new(5.0, 0.0, 0.0)),
        );
        let hip = scene.create_child("Hip", Some(other), DecomposedTransform::IDENTITY);
        let target = TargetSkeleton::from_bones(vec![
            bone("Root", None, DecomposedTransform::IDENTITY),
            bone(
                "Hip",
                Some("Root"),
                DecomposedTransform::from_translation(Vec3::Y),
            ),
        ])
        .unwrap();
        let mut mapping = vec![MappingBone::new("Root", Some(root)), flagged("Hip", hip)];
        let nodes = scene.len();

        let outcome = fix_positions(&mut scene, &target, &mut mapping).unwrap();
        assert_eq!((outcome.fast, outcome.general), (0, 1));
        assert_eq!(scene.len(), nodes);
        assert_eq!(scene.parent(hip), Some(other));
        assert!(scene.world_position(hip).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_parent_fixed_before_child() {
        let mut scene = SceneGraph::new();
        let root = scene.create_node("Root");
        let hip = scene.create_child("Hip", Some(root), DecomposedTransform::IDENTITY);
        let spine = scene.create_child("Spine", Some(hip), DecomposedTransform::IDENTITY);
        let target = TargetSkeleton::from_bones(vec![
            bone("Root", None, DecomposedTransform::IDENTITY),
            bone(
                "Spine",
                Some("Hip"),
                DecomposedTransform::from_translation(Vec3::Y),
            ),
            bone(
                "Hip",
                Some("Root"),
                DecomposedTransform::from_translation(Vec3::X),
            ),
        ])
        .unwrap();
        let mut mapping = vec![
            MappingBone::new("Root", Some(root)),
            flagged("Spine", spine),
            flagged("Hip", hip),
        ];
        let outcome = fix_positions(&mut scene, &target, &mut mapping).unwrap();
        assert_eq!(outcome.passes, 2);
        assert!(scene
            .world_position(spine)
            .abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_root_cannot_be_fixed() {
        let mut scene = SceneGraph::new();
        let root = scene.create_node("Root");
        let target =
            TargetSkeleton::from_bones(vec![bone("Root", None, DecomposedTransform::IDENTITY)])
                .unwrap();
        let mut mapping = vec![flagged("Root", root)];
        assert_eq!(
            fix_positions(&mut scene, &target, &mut mapping),
            Err(FixError::PositionFixOnRoot {
                name: "Root".to_string()
            })
        );
    }

    #[test]
    fn test_deadlock() {
        let mut scene = SceneGraph::new();
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        let target = TargetSkeleton::from_bones(vec![
            bone("A", Some("B"), DecomposedTransform::IDENTITY),
            bone("B", Some("A"), DecomposedTransform::IDENTITY),
        ])
        .unwrap();
        let mut mapping = vec![flagged("A", a), flagged("B", b)];
        assert_eq!(
            fix_positions(&mut scene, &target, &mut mapping),
            Err(FixError::PositionFixDeadlock {
                unresolved_names: vec!["A".to_string(), "B".to_string()],
            })
        );
    }
}
