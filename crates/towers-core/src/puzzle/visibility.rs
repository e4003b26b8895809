//! # Visibility Tracker
//!
//! Per `(triple, direction)` marks recording whether a tower, if placed,
//! must be seen or must be hidden from a grid edge.
//!
//! Both marks set at once means the triple cannot be placed at all.

use crate::types::{Direction, Triple};
use std::collections::BTreeMap;

/// The two independent marks for one triple and one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityInfo {
    pub seen: bool,
    pub hidden: bool,
}

impl VisibilityInfo {
    /// Both marks set.
    #[must_use]
    pub const fn is_contradictory(self) -> bool {
        self.seen && self.hidden
    }

    fn flag_mut(&mut self, seen: bool) -> &mut bool {
        if seen { &mut self.seen } else { &mut self.hidden }
    }
}

/// Lazily populated seen/hidden marks.
#[derive(Debug, Clone, Default)]
pub struct VisibilityTracker {
    info: BTreeMap<(Triple, Direction), VisibilityInfo>,
}

impl VisibilityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, triple: Triple, direction: Direction) -> &mut VisibilityInfo {
        self.info.entry((triple, direction)).or_default()
    }

    /// Set the seen (`seen == true`) or hidden flag. Returns whether it changed.
    pub fn add_info(&mut self, triple: Triple, direction: Direction, seen: bool) -> bool {
        let flag = self.entry(triple, direction).flag_mut(seen);
        let changed = !*flag;
        *flag = true;
        changed
    }

    /// Clear the seen or hidden flag. Returns whether it changed.
    pub fn remove_info(&mut self, triple: Triple, direction: Direction, seen: bool) -> bool {
        let Some(info) = self.info.get_mut(&(triple, direction)) else {
            return false;
        };
        let flag = info.flag_mut(seen);
        let changed = *flag;
        *flag = false;
        if *info == VisibilityInfo::default() {
            self.info.remove(&(triple, direction));
        }
        changed
    }

    /// Current marks, defaulting to neither.
    #[must_use]
    pub fn info(&self, triple: Triple, direction: Direction) -> VisibilityInfo {
        self.info
            .get(&(triple, direction))
            .copied()
            .unwrap_or_default()
    }

    /// Number of `(triple, direction)` pairs carrying any mark.
    #[must_use]
    pub fn len(&self) -> usize {
        self.info.len()
    }

    /// Whether no marks are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    /// Every marked pair, for snapshots.
    pub fn iter(&self) -> impl Iterator<Item = (Triple, Direction, VisibilityInfo)> + '_ {
        self.info.iter().map(|((t, d), info)| (*t, *d, *info))
    }
}
