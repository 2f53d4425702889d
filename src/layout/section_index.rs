//! SectionIndex - O(log n) section start offsets via Fenwick tree
//!
//! Each section contributes an *extent*: its content height plus the
//! inter-section gap that follows it. The start offset of section `s` is the
//! prefix sum of the extents before it, so a height change in one section
//! shifts every later section without touching them.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `prefix_sum`: O(log n)
//! - `start_of`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `push`: O(log n)
//! - `rebuild`: O(n log n)

/// Fenwick tree over per-section extents.
#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    /// Fenwick tree backing storage (1-indexed internally, but we expose 0-indexed API)
    tree: Vec<f64>,
    /// Raw extents, kept alongside the tree so `set` does not have to
    /// derive the current value from two prefix sums.
    extents: Vec<f64>,
}

impl SectionIndex {
    /// Creates an empty index with pre-allocated capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlayout::layout::section_index::SectionIndex;
    /// let index = SectionIndex::new(16);
    /// assert_eq!(index.len(), 0);
    /// assert_eq!(index.total(), 0.0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0.0; capacity],
            extents: Vec::with_capacity(capacity),
        }
    }

    /// Replaces all extents.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlayout::layout::section_index::SectionIndex;
    /// let mut index = SectionIndex::new(0);
    /// index.rebuild([10.0, 20.0]);
    /// assert_eq!(index.start_of(1), 10.0);
    /// ```
    pub fn rebuild(&mut self, extents: impl IntoIterator<Item = f64>) {
        self.clear();
        for extent in extents {
            self.push(extent);
        }
    }

    /// Sets the extent of section `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlayout::layout::section_index::SectionIndex;
    /// let mut index = SectionIndex::new(4);
    /// index.push(5.0);
    /// index.push(5.0);
    /// index.set(0, 12.0);
    /// assert_eq!(index.start_of(1), 12.0);
    /// ```
    pub fn set(&mut self, index: usize, extent: f64) {
        assert!(
            index < self.extents.len(),
            "index {} out of bounds (len: {})",
            index,
            self.extents.len()
        );

        let delta = extent - self.extents[index];
        self.extents[index] = extent;
        if delta != 0.0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Extent of section `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.extents.get(index).copied()
    }

    /// Cumulative extent up to and including `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn prefix_sum(&self, index: usize) -> f64 {
        assert!(
            index < self.extents.len(),
            "index {} out of bounds (len: {})",
            index,
            self.extents.len()
        );

        let sum = fenwick::array::prefix_sum(&self.tree, index);
        sum.max(0.0) // Rounding after many updates may dip below zero
    }

    /// Offset at which section `index` starts, relative to the first section.
    ///
    /// `start_of(len())` is the total; anything beyond clamps to it.
    pub fn start_of(&self, index: usize) -> f64 {
        if index == 0 || self.is_empty() {
            0.0
        } else {
            self.prefix_sum(index.min(self.extents.len()) - 1)
        }
    }

    /// First section whose range `[start, start + extent)` ends after `value`.
    ///
    /// Returns `None` if `value >= total()` or the index is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlayout::layout::section_index::SectionIndex;
    /// let mut index = SectionIndex::new(3);
    /// index.push(10.0); // [0..10)
    /// index.push(20.0); // [10..30)
    /// assert_eq!(index.lower_bound(0.0), Some(0));
    /// assert_eq!(index.lower_bound(10.0), Some(1));
    /// assert_eq!(index.lower_bound(30.0), None);
    /// ```
    pub fn lower_bound(&self, value: f64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        let mut left = 0;
        let mut right = self.extents.len();

        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > value {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        if left >= self.extents.len() {
            None
        } else {
            Some(left)
        }
    }

    /// Sum of all extents.
    pub fn total(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.prefix_sum(self.extents.len() - 1)
        }
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    /// True if there are no sections.
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Appends a section extent, growing backing storage if necessary.
    pub fn push(&mut self, extent: f64) {
        if self.extents.len() >= self.tree.len() {
            // Nodes past the old end cover ranges that include existing
            // entries, so the tree is rebuilt rather than zero-extended.
            self.tree = vec![0.0; self.tree.len().max(1) * 2];
            for (i, &existing) in self.extents.iter().enumerate() {
                fenwick::array::update(&mut self.tree, i, existing);
            }
        }

        let idx = self.extents.len();
        self.extents.push(extent);
        fenwick::array::update(&mut self.tree, idx, extent);
    }

    /// Removes all sections, retaining capacity.
    pub fn clear(&mut self) {
        for slot in self.tree.iter_mut() {
            *slot = 0.0;
        }
        self.extents.clear();
    }
}
