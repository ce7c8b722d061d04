//! Position within the step catalog. Clamps at both ends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Navigation {
    Moved { from: usize, to: usize },
    AtBoundary { index: usize },
    /// A jump to the step the cursor was already on.
    Unchanged { index: usize },
}

impl Navigation {
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Moved { to, .. } => *to,
            Self::AtBoundary { index } | Self::Unchanged { index } => *index,
        }
    }

    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Index bounded to `[0, len - 1]`; `len` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len: len.max(1),
        }
    }

    /// Cursor at `index`, clamped to the last step.
    #[must_use]
    pub fn at(index: usize, len: usize) -> Self {
        let mut cursor = Self::new(len);
        cursor.index = index.min(cursor.last());
        cursor
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    const fn last(&self) -> usize {
        self.len - 1
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn next(&mut self) -> Navigation {
        if self.index < self.last() {
            let from = self.index;
            self.index += 1;
            Navigation::Moved {
                from,
                to: self.index,
            }
        } else {
            Navigation::AtBoundary { index: self.index }
        }
    }

    pub fn previous(&mut self) -> Navigation {
        if self.index > 0 {
            let from = self.index;
            self.index -= 1;
            Navigation::Moved {
                from,
                to: self.index,
            }
        } else {
            Navigation::AtBoundary { index: self.index }
        }
    }

    pub fn jump(&mut self, index: usize) -> Navigation {
        let target = index.min(self.last());
        if target == self.index {
            return Navigation::Unchanged { index: self.index };
        }
        let from = self.index;
        self.index = target;
        Navigation::Moved { from, to: target }
    }

    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.index == self.last()
    }

    /// Percentage through the flow, counting the current step as reached.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn progress(&self) -> f64 {
        (self.index + 1) as f64 / self.len as f64 * 100.0
    }
}
