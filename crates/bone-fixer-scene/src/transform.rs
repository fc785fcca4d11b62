use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixNodeTransform(pub Mat4);

/// Local transform of a node, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecomposedTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for DecomposedTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DecomposedTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeTransform {
    Matrix(MatrixNodeTransform),
    Decomposed(DecomposedTransform),
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::Decomposed(DecomposedTransform::default())
    }
}

impl From<MatrixNodeTransform> for Mat4 {
    fn from(value: MatrixNodeTransform) -> Self {
        value.0
    }
}

impl From<DecomposedTransform> for Mat4 {
    fn from(value: DecomposedTransform) -> Self {
        value.matrix()
    }
}

impl From<NodeTransform> for Mat4 {
    fn from(value: NodeTransform) -> Self {
        match value {
            NodeTransform::Matrix(matrix) => matrix.0,
            NodeTransform::Decomposed(decomposed) => decomposed.into(),
        }
    }
}

impl From<NodeTransform> for DecomposedTransform {
    fn from(value: NodeTransform) -> Self {
        match value {
            NodeTransform::Matrix(matrix) => DecomposedTransform::from_matrix(matrix.0),
            NodeTransform::Decomposed(decomposed) => decomposed,
        }
    }
}
