//! The shared preview capability
//!
//! A preview is an ordered table of named numeric measurements taken at
//! successive checkpoints. Leaves ([`LeafPreview`](crate::LeafPreview)) and
//! collections ([`PreviewCollection`](crate::PreviewCollection)) both expose
//! it, so collections nest: folds × parameter values × checkpoints.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Opaque identity of the task type that produced a preview.
///
/// Stored and returned verbatim. Report consumers use it to pick a
/// rendering strategy; nothing in this crate branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskClass(Cow<'static, str>);

impl TaskClass {
    /// Task identity attached to cross-fold mean previews.
    pub const CROSS_VALIDATION: Self = Self(Cow::Borrowed("cross-validation"));

    /// Create a task identity from its name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Get the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for TaskClass {
    fn default() -> Self {
        Self::CROSS_VALIDATION
    }
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access to a table of named measurements.
///
/// Row `i` of [`entry_data`](Self::entry_data) holds one value per
/// measurement name, in name order.
pub trait Preview {
    /// Number of entries (checkpoints) available.
    fn num_entries(&self) -> usize;

    /// Number of measurement names (columns).
    fn measurement_name_count(&self) -> usize;

    /// Measurement name at `index`, or `None` past the last column.
    fn measurement_name(&self, index: usize) -> Option<&str>;

    /// All measurement names in column order.
    fn measurement_names(&self) -> Vec<&str> {
        (0..self.measurement_name_count())
            .filter_map(|i| self.measurement_name(i))
            .collect()
    }

    /// Values of one entry.
    ///
    /// # Errors
    ///
    /// Returns error if `entry_index` is out of range.
    fn entry_data(&self, entry_index: usize) -> Result<Vec<f64>>;

    /// Values of every entry, in entry order.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`entry_data`](Self::entry_data).
    fn data(&self) -> Result<Vec<Vec<f64>>> {
        (0..self.num_entries()).map(|i| self.entry_data(i)).collect()
    }

    /// Comma-separated rendering of one entry.
    ///
    /// # Errors
    ///
    /// Returns error if `entry_index` is out of range.
    fn entry_to_string(&self, entry_index: usize) -> Result<String>;

    /// Task type that produced this preview.
    fn task_class(&self) -> &TaskClass;

    /// Child-slot view if this preview is a collection of previews.
    fn as_group(&self) -> Option<&dyn PreviewGroup> {
        None
    }
}

/// Slot-indexed access to the children of a composite preview.
pub trait PreviewGroup {
    /// Number of populated child slots.
    fn slot_count(&self) -> usize;

    /// Child at `slot`, or `None` past the last slot.
    fn preview_at(&self, slot: usize) -> Option<&dyn Preview>;
}

pub(crate) fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
