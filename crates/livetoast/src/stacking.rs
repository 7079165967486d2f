#![forbid(unsafe_code)]

//! Stacking engine.
//!
//! Pure function of the current front-to-back order, the record heights and
//! the expansion mode. Nothing here touches the registry or the surface.
//!
//! For the toast at position `i` (0 = front) among `n`:
//!
//! ```text
//! rank     = i
//! z_order  = n - i
//! is_front = i == 0
//! offset   = sum(height[0..i]) + gap * i      (expanded only)
//! ```

use crate::host::{VisualAttrs, WrapperId};
use crate::registry::ToastRecord;

/// Attributes for one toast.
#[derive(Debug, Clone, PartialEq)]
pub struct StackEntry {
    /// Toast the attributes belong to.
    pub wrapper_id: WrapperId,
    /// Derived attributes.
    pub attrs: VisualAttrs,
}

/// Result of one recompute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackLayout {
    /// Entries in front-to-back order.
    pub entries: Vec<StackEntry>,
    /// Height of the front toast, if any.
    pub front_height: Option<f64>,
}

impl StackLayout {
    /// Attributes for one toast.
    #[must_use]
    pub fn get(&self, wrapper_id: &str) -> Option<&VisualAttrs> {
        self.entries
            .iter()
            .find(|entry| entry.wrapper_id.as_str() == wrapper_id)
            .map(|entry| &entry.attrs)
    }

    /// The front toast.
    #[must_use]
    pub fn front(&self) -> Option<&StackEntry> {
        self.entries.first()
    }
}

/// Stateless layout calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackingEngine {
    gap: f64,
}

impl StackingEngine {
    /// Create an engine with the given expanded-mode spacing.
    #[must_use]
    pub const fn new(gap: f64) -> Self {
        Self { gap }
    }

    /// Expanded-mode spacing.
    #[must_use]
    pub const fn gap(&self) -> f64 {
        self.gap
    }

    /// Derive attributes for `records`, front first.
    ///
    /// The sequence is walked twice: once to count, once to lay out.
    pub fn recompute<'a, I>(&self, records: I, expanded: bool) -> StackLayout
    where
        I: IntoIterator<Item = &'a ToastRecord>,
        I::IntoIter: Clone,
    {
        let records = records.into_iter();
        let total = records.clone().count();
        let mut entries = Vec::with_capacity(total);
        let mut front_height = None;
        let mut running = 0.0;

        for (rank, record) in records.enumerate() {
            if rank == 0 {
                front_height = Some(record.height());
            }
            let offset = expanded.then_some(running);
            running += record.height() + self.gap;
            entries.push(StackEntry {
                wrapper_id: record.wrapper_id().clone(),
                attrs: VisualAttrs {
                    rank,
                    z_order: total - rank,
                    is_front: rank == 0,
                    expanded,
                    offset,
                },
            });
        }

        StackLayout {
            entries,
            front_height,
        }
    }
}

impl Default for StackingEngine {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_GAP)
    }
}
