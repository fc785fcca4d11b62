use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};

use log::warn;

use crate::{error::FixError, host::BoneHost};

/// Which side of the repair a bone set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoneSetLabel {
    /// The outdated skeleton being repaired.
    Broken,
    /// The reference skeleton.
    Model,
}

impl Display for BoneSetLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BoneSetLabel::Broken => write!(f, "broken"),
            BoneSetLabel::Model => write!(f, "model"),
        }
    }
}

/// Bone name -> slot in a bone set. Empty slots are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoneIndex {
    indices: HashMap<String, usize>,
}

impl BoneIndex {
    /// Index bone names by slot, failing on the first duplicated name.
    ///
    /// A later occurrence overwrites the slot of an earlier one; the whole
    /// set is still walked so the error names the first duplicate found.
    pub fn from_names<'a>(
        names: impl IntoIterator<Item = Option<&'a str>>,
        label: BoneSetLabel,
    ) -> Result<Self, FixError> {
        let mut indices = HashMap::new();
        let mut duplicated = None;
        for (index, name) in names.into_iter().enumerate() {
            let Some(name) = name else {
                continue;
            };
            if indices.insert(name.to_string(), index).is_some() && duplicated.is_none() {
                warn!("Name of bones of {} duplicated: {}", label, name);
                duplicated = Some(name.to_string());
            }
        }
        match duplicated {
            Some(name) => Err(FixError::DuplicateBoneName { label, name }),
            None => Ok(Self { indices }),
        }
    }

    pub fn of_bones<H: BoneHost>(
        host: &H,
        bones: &[Option<H::Bone>],
        label: BoneSetLabel,
    ) -> Result<Self, FixError> {
        Self::from_names(
            bones.iter().map(|bone| bone.and_then(|bone| host.name(bone))),
            label,
        )
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.indices
            .iter()
            .map(|(name, index)| (name.as_str(), *index))
    }
}

#[cfg(test)]
mod test {
    use super::{BoneIndex, BoneSetLabel};
    use crate::error::FixError;

    #[test]
    fn test_index_skips_empty_slots() {
        let index = BoneIndex::from_names(
            [Some("Root"), None, Some("Hip")],
            BoneSetLabel::Broken,
        )
        .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Root"), Some(0));
        assert_eq!(index.get("Hip"), Some(2));
        assert_eq!(index.get("Spine"), None);
    }

    #[test]
    fn test_index_duplicate() {
        let result = BoneIndex::from_names(
            [Some("Root"), Some("Hip"), Some("Root"), Some("Hip")],
            BoneSetLabel::Model,
        );
        assert_eq!(
            result,
            Err(FixError::DuplicateBoneName {
                label: BoneSetLabel::Model,
                name: "Root".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_message() {
        let error = BoneIndex::from_names([Some("Hip"), Some("Hip")], BoneSetLabel::Broken)
            .unwrap_err();
        assert_eq!(error.to_string(), "Name of bones of broken duplicated: Hip");
    }
}
