use bone_fixer_scene::DecomposedTransform;

use crate::{
    error::FixError,
    host::BoneHost,
    index::{BoneIndex, BoneSetLabel},
};

/// One slot of the model bone set, as it was when captured.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetBone {
    pub name: String,
    /// Name of the parent node, whether or not it is itself a bone.
    pub parent: Option<String>,
    pub transform: DecomposedTransform,
}

/// Immutable copy of the model skeleton. Captured before anything is mutated,
/// so repair never reads a half-edited model even when both skeletons live in
/// the same host.
#[derive(Debug, Clone)]
pub struct TargetSkeleton {
    bones: Vec<TargetBone>,
    index: BoneIndex,
}

impl TargetSkeleton {
    pub fn capture<H: BoneHost>(host: &H, renderer: H::Renderer) -> Result<Self, FixError> {
        let slots = host.bones(renderer);
        let index = BoneIndex::of_bones(host, &slots, BoneSetLabel::Model)?;
        let bones = slots
            .into_iter()
            .enumerate()
            .map(|(slot, bone)| {
                let bone = bone.ok_or(FixError::EmptyTargetSlot { index: slot })?;
                let name = host
                    .name(bone)
                    .ok_or(FixError::EmptyTargetSlot { index: slot })?;
                Ok(TargetBone {
                    name: name.to_string(),
                    parent: host
                        .parent(bone)
                        .and_then(|parent| host.name(parent))
                        .map(str::to_string),
                    transform: host.local_transform(bone),
                })
            })
            .collect::<Result<_, FixError>>()?;
        Ok(Self { bones, index })
    }

    pub fn from_bones(bones: Vec<TargetBone>) -> Result<Self, FixError> {
        let index = BoneIndex::from_names(
            bones.iter().map(|bone| Some(bone.name.as_str())),
            BoneSetLabel::Model,
        )?;
        Ok(Self { bones, index })
    }

    pub fn bones(&self) -> &[TargetBone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn index(&self) -> &BoneIndex {
        &self.index
    }

    /// Slot of the bone's parent, `None` when the parent is not a model bone.
    pub fn parent_slot(&self, slot: usize) -> Option<usize> {
        let parent = self.bones.get(slot)?.parent.as_deref()?;
        self.index.get(parent)
    }
}

#[cfg(test)]
mod test {
    use bone_fixer_scene::DecomposedTransform;

    use super::{TargetBone, TargetSkeleton};

    fn bone(name: &str, parent: Option<&str>) -> TargetBone {
        TargetBone {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            transform: DecomposedTransform::IDENTITY,
        }
    }

    #[test]
    fn test_parent_slot() {
        let target = TargetSkeleton::from_bones(vec![
            bone("Spine", Some("Hip")),
            bone("Hip", Some("Armature")),
            bone("Head", Some("Spine")),
        ])
        .unwrap();
        assert_eq!(target.parent_slot(0), Some(1));
        assert_eq!(target.parent_slot(1), None);
        assert_eq!(target.parent_slot(2), Some(0));
        assert_eq!(target.parent_slot(3), None);
    }
}
