//! Material group remapping after topology changes
//!
//! Simplification does not preserve which triangle belonged to which
//! material, only how many there are. Groups are therefore rescaled
//! proportionally and re-packed so they stay contiguous, disjoint and inside
//! the new index range.

use meshslim_core::MaterialGroup;

/// Rescale material groups from `old_index_count` to `new_index_count`.
///
/// Each group's count is scaled and floored to whole triangles, then the
/// groups are packed back to back. A group that would run past the end is truncated; the
/// remainder left by flooring is given to the last group so no trailing
/// triangles go undrawn.
pub fn remap_groups(
    groups: &[MaterialGroup],
    new_index_count: usize,
    old_index_count: usize,
) -> Vec<MaterialGroup> {
    if groups.is_empty() {
        return Vec::new();
    }
    if old_index_count == 0 {
        return clamp_groups(groups, new_index_count);
    }

    let scale = new_index_count as f64 / old_index_count as f64;
    let mut remapped = Vec::with_capacity(groups.len());
    let mut offset = 0usize;

    for group in groups {
        let scaled_count = whole_triangles((group.count as f64 * scale).floor() as usize);
        let start = offset.min(new_index_count);
        let count = scaled_count.min(whole_triangles(new_index_count - start));
        remapped.push(MaterialGroup::new(start, count, group.material_index));
        offset = start + count;
    }

    if let Some(last) = remapped.last_mut() {
        if offset < new_index_count {
            last.count += new_index_count - offset;
        }
    }

    remapped
}

fn whole_triangles(index_count: usize) -> usize {
    index_count / 3 * 3
}

/// Clamp groups into `[0, index_count)` without rescaling
fn clamp_groups(groups: &[MaterialGroup], index_count: usize) -> Vec<MaterialGroup> {
    groups
        .iter()
        .map(|g| {
            let start = g.start.min(index_count);
            let count = g.count.min(index_count - start);
            MaterialGroup::new(start, count, g.material_index)
        })
        .collect()
}
