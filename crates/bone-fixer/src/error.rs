use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::index::BoneSetLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixError {
    DuplicateBoneName { label: BoneSetLabel, name: String },
    MeshMismatch,
    EmptyTargetSlot { index: usize },
    MappingLengthMismatch { expected: usize, actual: usize },
    MappedBoneRemoved { name: String },
    DuplicateMappedBone { name: String },
    StaleBone { name: String },
    UnresolvableParent { unresolved_names: Vec<String> },
    PositionFixOnRoot { name: String },
    PositionFixDeadlock { unresolved_names: Vec<String> },
}

impl Display for FixError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FixError::DuplicateBoneName { label, name } => {
                write!(f, "Name of bones of {} duplicated: {}", label, name)
            }
            FixError::MeshMismatch => write!(f, "Mesh mismatch"),
            FixError::EmptyTargetSlot { index } => {
                write!(f, "Bone slot #{} of model is empty", index)
            }
            FixError::MappingLengthMismatch { expected, actual } => write!(
                f,
                "Mapping is out of date: model has {} bones, but mapping has {} rows",
                expected, actual
            ),
            FixError::MappedBoneRemoved { name } => {
                write!(f, "Bone {} is mapped to a bone which will be removed", name)
            }
            FixError::DuplicateMappedBone { name } => {
                write!(f, "Bone {} is mapped to a bone already used by another row", name)
            }
            FixError::StaleBone { name } => write!(f, "Bone {} no longer exists", name),
            FixError::UnresolvableParent { unresolved_names } => write!(
                f,
                "Parent of bones cannot be resolved: {}",
                unresolved_names.join(", ")
            ),
            FixError::PositionFixOnRoot { name } => {
                write!(f, "Cannot fix position of root bone {}", name)
            }
            FixError::PositionFixDeadlock { unresolved_names } => write!(
                f,
                "Position of bones cannot be fixed: {}",
                unresolved_names.join(", ")
            ),
        }
    }
}

impl Error for FixError {}
