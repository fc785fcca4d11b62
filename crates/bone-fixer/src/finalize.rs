use log::debug;

use crate::{diff::MappingBone, error::FixError, host::BoneHost};

/// Write the mapped bones back to the renderer in model order, as one
/// replacement array.
pub fn finalize<H: BoneHost>(
    host: &mut H,
    renderer: H::Renderer,
    mapping: &[MappingBone<H::Bone>],
) -> Result<usize, FixError> {
    let unresolved_names: Vec<String> = mapping
        .iter()
        .filter(|row| row.bone.is_none())
        .map(|row| row.name.clone())
        .collect();
    if !unresolved_names.is_empty() {
        return Err(FixError::UnresolvableParent { unresolved_names });
    }
    let bones: Vec<H::Bone> = mapping.iter().filter_map(|row| row.bone).collect();
    let count = bones.len();
    host.set_bones(renderer, bones);
    debug!("Wrote {} bones to {:?}", count, renderer);
    Ok(count)
}
