/// Index of the highlighted GIF, or nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection(Option<usize>);

impl Selection {
    pub fn get(&self) -> Option<usize> {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Selects `index` if it is inside `0..len`. Out-of-range indices are
    /// rejected, not clamped; returns whether the selection changed hands.
    pub fn set(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.0 = Some(index);
        true
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Drops the selection if it no longer fits a result set of `len` items.
    pub fn fit(&mut self, len: usize) {
        if matches!(self.0, Some(i) if i >= len) {
            self.0 = None;
        }
    }
}
