//! In-place edits of the broken hierarchy.
//!
//! Both resolution loops share one shape: sweep the mapping in model order,
//! resolve every row whose parent is already resolved, and repeat until a
//! sweep resolves nothing. A sweep that makes no progress while rows remain
//! is the only failure signal, so acyclic inputs finish in at most
//! depth + 1 sweeps.
pub mod position;
pub mod structure;

use crate::diff::MappingBone;

fn pending_names<B>(
    mapping: &[MappingBone<B>],
    pending: impl Fn(&MappingBone<B>) -> bool,
) -> Vec<String> {
    mapping
        .iter()
        .filter(|row| pending(row))
        .map(|row| row.name.clone())
        .collect()
}
