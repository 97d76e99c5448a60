/// Visibility delta tracking.
///
/// A visibility pass marks every hit area in the `current` bitset, then
/// diffs it word by word against the `previous` snapshot. Set bits that
/// appeared become `new_visible` entries and are appended to their group's
/// dense `visible` list; bits that vanished become `new_invisible` entries
/// and are swap-removed from it. Each area remembers its position in the
/// `visible` list so the swap-remove is O(1).

use slotmap::SecondaryMap;
use crate::utils::SetBits;
use super::types::{AreaId, AreaIds, GroupKey};

const NOT_VISIBLE: u32 = u32::MAX;

/// Per-group visibility lists, valid until the next pass
#[derive(Debug, Default)]
pub struct GroupVisibility {
    visible: Vec<AreaIds>,
    new_visible: Vec<AreaIds>,
    new_invisible: Vec<AreaIds>,
    // Visible areas removed since the last pass
    pending_invisible: Vec<AreaIds>,
}

impl GroupVisibility {
    /// Areas visible as of the last pass
    pub fn visible(&self) -> &[AreaIds] {
        &self.visible
    }

    /// Areas that became visible during the last pass
    pub fn new_visible(&self) -> &[AreaIds] {
        &self.new_visible
    }

    /// Areas that stopped being visible during the last pass (or were
    /// removed while visible)
    pub fn new_invisible(&self) -> &[AreaIds] {
        &self.new_invisible
    }

    fn remove_visible(&mut self, index: u32, visible_index: &mut [u32]) -> AreaIds {
        let removed = self.visible.swap_remove(index as usize);
        if let Some(moved) = self.visible.get(index as usize) {
            visible_index[moved.area_id.slot()] = index;
        }
        removed
    }
}

pub(crate) struct VisibilityTracker {
    current: Vec<u32>,
    previous: Vec<u32>,
    visible_index: Vec<u32>,
    groups: SecondaryMap<GroupKey, GroupVisibility>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
            previous: Vec::new(),
            visible_index: Vec::new(),
            groups: SecondaryMap::new(),
        }
    }

    pub fn add_group(&mut self, group: GroupKey) {
        self.groups.insert(group, GroupVisibility::default());
    }

    pub fn remove_group(&mut self, group: GroupKey) {
        self.groups.remove(group);
    }

    pub fn group(&self, group: GroupKey) -> Option<&GroupVisibility> {
        self.groups.get(group)
    }

    /// Grow the bitsets to cover ids below `id_count`
    pub fn ensure_capacity(&mut self, id_count: usize) {
        let words = id_count.div_ceil(32);
        if self.current.len() < words {
            self.current.resize(words, 0);
            self.previous.resize(words, 0);
        }
        if self.visible_index.len() < id_count {
            self.visible_index.resize(id_count, NOT_VISIBLE);
        }
    }

    /// Visible as of the last completed pass
    pub fn is_visible(&self, id: AreaId) -> bool {
        let (word, bit) = split(id);
        self.previous.get(word).is_some_and(|bits| bits & bit != 0)
    }

    /// Reset per-pass lists; removed-while-visible areas are reported now
    pub fn begin_pass(&mut self, id_count: usize) {
        self.ensure_capacity(id_count);
        for (_, group) in self.groups.iter_mut() {
            group.new_visible.clear();
            group.new_invisible.clear();
            let pending = std::mem::take(&mut group.pending_invisible);
            group.new_invisible.extend(pending);
        }
    }

    /// Mark an area hit in the pass being accumulated
    #[inline]
    pub fn mark(&mut self, id: AreaId) {
        let (word, bit) = split(id);
        self.current[word] |= bit;
    }

    /// Diff the accumulated bits against the previous snapshot and rotate.
    ///
    /// `resolve` maps a live area id to its identity tuple.
    pub fn finish_pass<F>(&mut self, resolve: F)
    where
        F: Fn(AreaId) -> AreaIds,
    {
        for word in 0..self.current.len() {
            let current = self.current[word];
            let previous = self.previous[word];
            self.current[word] = 0;
            if current == previous {
                continue;
            }
            self.previous[word] = current;

            for bit in SetBits(current & !previous) {
                let ids = resolve(AreaId(word as u32 * 32 + bit));
                if let Some(group) = self.groups.get_mut(ids.group) {
                    self.visible_index[ids.area_id.slot()] = group.visible.len() as u32;
                    group.visible.push(ids);
                    group.new_visible.push(ids);
                }
            }

            for bit in SetBits(previous & !current) {
                let id = AreaId(word as u32 * 32 + bit);
                let ids = resolve(id);
                let index = std::mem::replace(&mut self.visible_index[id.slot()], NOT_VISIBLE);
                if let Some(group) = self.groups.get_mut(ids.group) {
                    if index != NOT_VISIBLE {
                        group.remove_visible(index, &mut self.visible_index);
                    }
                    group.new_invisible.push(ids);
                }
            }
        }
    }

    /// Drop an area that is being removed.
    ///
    /// If it was visible it leaves its group's `visible` list now and is
    /// reported in the group's next `new_invisible`.
    pub fn forget(&mut self, ids: AreaIds) {
        let (word, bit) = split(ids.area_id);
        if let Some(bits) = self.current.get_mut(word) {
            *bits &= !bit;
        }
        let Some(bits) = self.previous.get_mut(word) else {
            return;
        };
        if *bits & bit == 0 {
            return;
        }
        *bits &= !bit;

        let index = std::mem::replace(&mut self.visible_index[ids.area_id.slot()], NOT_VISIBLE);
        if let Some(group) = self.groups.get_mut(ids.group) {
            if index != NOT_VISIBLE {
                group.remove_visible(index, &mut self.visible_index);
            }
            group.pending_invisible.push(ids);
        }
    }
}

#[inline]
fn split(id: AreaId) -> (usize, u32) {
    (id.slot() / 32, 1 << (id.index() % 32))
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
