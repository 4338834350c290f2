//! Input selection
//!
//! Caret and selection state for text controls.

/// Selection direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionDirection {
    #[default]
    None,
    Forward,
    Backward,
}

/// Input element selection (for text inputs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSelection {
    /// Selection start
    pub start: usize,
    /// Selection end
    pub end: usize,
    /// Selection direction
    pub direction: SelectionDirection,
}

impl InputSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the range, clamping both ends to `text_length`
    pub fn set_range(&mut self, start: usize, end: usize, text_length: usize) {
        let end = end.min(text_length);
        self.start = start.min(end);
        self.end = end;
        self.direction = SelectionDirection::None;
    }

    /// Collapse the caret at `offset`
    pub fn collapse(&mut self, offset: usize) {
        self.start = offset;
        self.end = offset;
        self.direction = SelectionDirection::None;
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn length(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn range(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}
