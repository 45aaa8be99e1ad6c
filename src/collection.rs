//! Preview Collection - interlaced view over slot-indexed child previews
//!
//! ## Layout
//!
//! ```text
//! PreviewCollection
//!   ├── slot 0: preview (fold / parameter value)
//!   ├── slot 1: preview
//!   └── ...
//!
//! interlaced entry i  ->  [i, i mod n] ++ child[i mod n].entry(i div n)
//! ```
//!
//! All children share one measurement-name contract, captured from the first
//! non-empty preview. Only the common prefix of `min_entry_num` entries per
//! child is exposed, so every interlaced row is backed by every child.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::VariedParameter;
use crate::preview::{Preview, PreviewGroup, TaskClass};
use crate::{Error, Result};

/// Ordered, slot-indexed collection of child previews.
///
/// Slots fill contiguously: a preview may be set at any existing slot or at
/// exactly one past the end. Producers typically call
/// [`set_preview`](Self::set_preview) repeatedly for the same slot as a run
/// progresses, each time with a longer preview.
///
/// # Example
///
/// ```rust
/// use trueno_preview::{LeafPreview, Preview, PreviewCollection, TaskClass};
///
/// # fn main() -> trueno_preview::Result<()> {
/// let mut folds = PreviewCollection::new("id", "fold", TaskClass::CROSS_VALIDATION);
/// folds.set_preview(0, LeafPreview::new(["acc"], vec![vec![0.8], vec![0.9]])?)?;
/// folds.set_preview(1, LeafPreview::new(["acc"], vec![vec![0.7]])?)?;
///
/// assert_eq!(folds.header_to_string(), "id,fold,acc");
/// assert_eq!(folds.num_entries(), 2);
/// assert_eq!(folds.entry_to_string(1)?, "1,1,0.7");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct PreviewCollection<T> {
    ordering_name: String,
    index_name: String,
    previews: Vec<T>,
    required_measurement_names: Vec<String>,
    measurement_names: Vec<String>,
    min_entry_num: usize,
    task_class: TaskClass,
    varied_param: Option<VariedParameter>,
}

impl<T> PreviewCollection<T> {
    /// Create an empty collection.
    ///
    /// # Arguments
    ///
    /// * `ordering_name` - Label of the interlaced row id column
    /// * `index_name` - Label of the child slot id column
    /// * `task_class` - Task type that produces this collection
    #[must_use]
    pub fn new(
        ordering_name: impl Into<String>,
        index_name: impl Into<String>,
        task_class: TaskClass,
    ) -> Self {
        Self::builder(ordering_name, index_name)
            .task_class(task_class)
            .build()
    }

    /// Create a builder for a collection with optional fields.
    #[must_use]
    pub fn builder(
        ordering_name: impl Into<String>,
        index_name: impl Into<String>,
    ) -> PreviewCollectionBuilder<T> {
        PreviewCollectionBuilder::new(ordering_name, index_name)
    }

    /// Get the label of the interlaced row id column.
    #[must_use]
    pub fn ordering_name(&self) -> &str {
        &self.ordering_name
    }

    /// Get the label of the child slot id column.
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Get the child previews in slot order.
    #[must_use]
    pub fn previews(&self) -> &[T] {
        &self.previews
    }

    /// Number of populated child slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.previews.len()
    }

    /// Check if no child has been set yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }

    /// Measurement names every child must provide (empty until the first
    /// non-empty child is set).
    #[must_use]
    pub fn required_measurement_names(&self) -> &[String] {
        &self.required_measurement_names
    }

    /// Minimum entry count over all children.
    #[must_use]
    pub const fn min_entry_num(&self) -> usize {
        self.min_entry_num
    }

    /// Get the varied parameter, if this collection is a sweep.
    #[must_use]
    pub const fn varied_param(&self) -> Option<&VariedParameter> {
        self.varied_param.as_ref()
    }

    /// Get the varied parameter name, if any.
    #[must_use]
    pub fn varied_param_name(&self) -> Option<&str> {
        self.varied_param.as_ref().map(VariedParameter::name)
    }

    /// Get the scanned parameter values, if any.
    #[must_use]
    pub fn varied_param_values(&self) -> Option<&[f64]> {
        self.varied_param.as_ref().map(VariedParameter::values)
    }

    /// Comma-joined measurement names, the first line of a report.
    #[must_use]
    pub fn header_to_string(&self) -> String {
        self.measurement_names.join(",")
    }
}

impl<T: Preview> PreviewCollection<T> {
    /// Set the preview at `index`.
    ///
    /// Empty previews are ignored. A preview replaces the current occupant of
    /// its slot only if it has strictly more entries; otherwise the call is a
    /// no-op. A failed call leaves the collection unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIndex`] if `index` is more than one past the last slot
    /// - [`Error::ContractMismatch`] if the measurement names differ from the
    ///   names of the first preview added
    pub fn set_preview(&mut self, index: usize, preview: T) -> Result<()> {
        let entries = preview.num_entries();
        if entries == 0 {
            trace!(index, "ignoring empty preview");
            return Ok(());
        }

        let len = self.previews.len();
        if index > len {
            debug!(index, len, "rejecting preview: index skips ahead of filled slots");
            return Err(Error::InvalidIndex { index, len });
        }

        if !self.previews.is_empty() && !self.matches_contract(&preview) {
            debug!(index, "rejecting preview: measurement names differ");
            return Err(Error::ContractMismatch {
                expected: self.required_measurement_names.clone(),
                found: owned_names(&preview),
            });
        }

        if index == len {
            if self.previews.is_empty() {
                self.required_measurement_names = owned_names(&preview);
                self.measurement_names
                    .extend(self.required_measurement_names.iter().cloned());
            }
            self.previews.push(preview);
        } else if entries > self.previews[index].num_entries() {
            self.previews[index] = preview;
        } else {
            trace!(index, entries, "ignoring preview: not longer than stored one");
            return Ok(());
        }

        self.min_entry_num = self
            .previews
            .iter()
            .map(Preview::num_entries)
            .min()
            .unwrap_or(0);
        debug!(index, entries, min_entry_num = self.min_entry_num, "stored preview");

        Ok(())
    }

    /// Render the child row `row` of slot `slot`.
    ///
    /// The ordering value is `row * len() + slot`, the position of that row
    /// in the interlaced view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryOutOfRange`] if the slot or row is not exposed
    /// by the interlaced view.
    pub fn entry_to_string_at(&self, slot: usize, row: usize) -> Result<String> {
        let n = self.previews.len();
        let ordering = row * n + slot;
        if slot >= n || row >= self.min_entry_num {
            return Err(Error::EntryOutOfRange {
                index: ordering,
                len: self.num_entries(),
            });
        }

        let child = self.previews[slot].entry_to_string(row)?;
        Ok(format!("{ordering},{slot},{child}"))
    }

    /// Append the report to `out`: the header, then each interlaced entry on
    /// its own line indented by `indent` spaces.
    ///
    /// # Errors
    ///
    /// Propagates errors from the children's entry rendering.
    pub fn describe(&self, out: &mut String, indent: usize) -> Result<()> {
        out.push_str(&self.header_to_string());
        for entry in 0..self.num_entries() {
            out.push('\n');
            out.push_str(&" ".repeat(indent));
            out.push_str(&self.entry_to_string(entry)?);
        }
        Ok(())
    }

    fn matches_contract(&self, preview: &T) -> bool {
        preview.measurement_name_count() == self.required_measurement_names.len()
            && self
                .required_measurement_names
                .iter()
                .enumerate()
                .all(|(i, name)| preview.measurement_name(i) == Some(name.as_str()))
    }

    fn check_entry(&self, entry_index: usize) -> Result<()> {
        if self.previews.is_empty() {
            return Err(Error::EmptyCollection);
        }
        let len = self.min_entry_num * self.previews.len();
        if entry_index >= len {
            return Err(Error::EntryOutOfRange {
                index: entry_index,
                len,
            });
        }
        Ok(())
    }
}

fn owned_names<P: Preview + ?Sized>(preview: &P) -> Vec<String> {
    preview
        .measurement_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl<T: Preview> Preview for PreviewCollection<T> {
    fn num_entries(&self) -> usize {
        self.min_entry_num * self.previews.len()
    }

    fn measurement_name_count(&self) -> usize {
        self.measurement_names.len()
    }

    fn measurement_name(&self, index: usize) -> Option<&str> {
        self.measurement_names.get(index).map(String::as_str)
    }

    #[allow(clippy::cast_precision_loss)]
    fn entry_data(&self, entry_index: usize) -> Result<Vec<f64>> {
        self.check_entry(entry_index)?;
        let n = self.previews.len();
        let slot = entry_index % n;
        let child = self.previews[slot].entry_data(entry_index / n)?;

        let mut entry = Vec::with_capacity(self.measurement_names.len());
        entry.push(entry_index as f64);
        entry.push(slot as f64);
        entry.extend(child);
        Ok(entry)
    }

    fn entry_to_string(&self, entry_index: usize) -> Result<String> {
        if self.previews.is_empty() {
            return Ok(String::new());
        }
        self.check_entry(entry_index)?;
        let n = self.previews.len();
        self.entry_to_string_at(entry_index % n, entry_index / n)
    }

    fn task_class(&self) -> &TaskClass {
        &self.task_class
    }

    fn as_group(&self) -> Option<&dyn PreviewGroup> {
        Some(self)
    }
}

impl<T: Preview> PreviewGroup for PreviewCollection<T> {
    fn slot_count(&self) -> usize {
        self.previews.len()
    }

    fn preview_at(&self, slot: usize) -> Option<&dyn Preview> {
        self.previews.get(slot).map(|p| p as &dyn Preview)
    }
}

/// Renders the [`describe`](PreviewCollection::describe) report.
///
/// A child that fails `entry_to_string` for a row it reports as present
/// surfaces as `fmt::Error`, which makes `to_string()` panic. Call
/// `describe` directly to get the underlying [`Error`] instead.
impl<T: Preview> fmt::Display for PreviewCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut report = String::new();
        self.describe(&mut report, 0).map_err(|_| fmt::Error)?;
        f.write_str(&report)
    }
}

/// Builder for `PreviewCollection<T>`.
#[derive(Debug)]
pub struct PreviewCollectionBuilder<T> {
    ordering_name: String,
    index_name: String,
    task_class: TaskClass,
    varied_param: Option<VariedParameter>,
    preview: PhantomData<fn() -> T>,
}

impl<T> PreviewCollectionBuilder<T> {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(ordering_name: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            ordering_name: ordering_name.into(),
            index_name: index_name.into(),
            task_class: TaskClass::default(),
            varied_param: None,
            preview: PhantomData,
        }
    }

    /// Set the task type that produces the collection.
    #[must_use]
    pub fn task_class(mut self, task_class: TaskClass) -> Self {
        self.task_class = task_class;
        self
    }

    /// Mark the collection as a sweep over one parameter.
    #[must_use]
    pub fn varied_param(mut self, varied_param: VariedParameter) -> Self {
        self.varied_param = Some(varied_param);
        self
    }

    /// Build the empty `PreviewCollection`.
    #[must_use]
    pub fn build(self) -> PreviewCollection<T> {
        trace!(
            ordering = %self.ordering_name,
            index = %self.index_name,
            task = %self.task_class,
            "new preview collection"
        );

        PreviewCollection {
            measurement_names: vec![self.ordering_name.clone(), self.index_name.clone()],
            ordering_name: self.ordering_name,
            index_name: self.index_name,
            previews: Vec::new(),
            required_measurement_names: Vec::new(),
            min_entry_num: 0,
            task_class: self.task_class,
            varied_param: self.varied_param,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LeafPreview;

    fn leaf(names: &[&str], rows: usize, offset: f64) -> LeafPreview {
        #[allow(clippy::cast_precision_loss)]
        let data = (0..rows)
            .map(|r| names.iter().map(|_| offset + r as f64).collect())
            .collect();
        LeafPreview::new(names.iter().copied(), data).unwrap()
    }

    fn folds() -> PreviewCollection<LeafPreview> {
        PreviewCollection::new("id", "fold", TaskClass::CROSS_VALIDATION)
    }

    #[test]
    fn test_new_collection_is_empty() {
        let c = folds();
        assert!(c.is_empty());
        assert_eq!(c.num_entries(), 0);
        assert_eq!(c.header_to_string(), "id,fold");
        assert_eq!(c.ordering_name(), "id");
        assert_eq!(c.index_name(), "fold");
        assert!(c.varied_param_name().is_none());
        assert!(c.varied_param_values().is_none());
    }

    #[test]
    fn test_first_preview_sets_contract() {
        let mut c = folds();
        c.set_preview(0, leaf(&["acc"], 2, 0.0)).unwrap();

        assert_eq!(c.required_measurement_names(), &["acc".to_string()]);
        assert_eq!(c.header_to_string(), "id,fold,acc");
        assert_eq!(c.measurement_name_count(), 3);
        assert_eq!(c.min_entry_num(), 2);
    }

    #[test]
    fn test_empty_preview_is_ignored() {
        let mut c = folds();
        c.set_preview(5, LeafPreview::empty(["acc"])).unwrap();
        assert!(c.is_empty());
        assert!(c.required_measurement_names().is_empty());
    }

    #[test]
    fn test_skip_ahead_is_rejected() {
        let mut c = folds();
        let err = c.set_preview(1, leaf(&["acc"], 1, 0.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex { index: 1, len: 0 }));
        assert!(c.required_measurement_names().is_empty());
        assert_eq!(c.header_to_string(), "id,fold");
    }

    #[test]
    fn test_min_entry_num_tracks_shortest_child() {
        let mut c = folds();
        c.set_preview(0, leaf(&["acc"], 4, 0.0)).unwrap();
        c.set_preview(1, leaf(&["acc"], 2, 0.0)).unwrap();
        assert_eq!(c.min_entry_num(), 2);
        assert_eq!(c.num_entries(), 4);

        c.set_preview(1, leaf(&["acc"], 5, 0.0)).unwrap();
        assert_eq!(c.min_entry_num(), 4);
        assert_eq!(c.num_entries(), 8);
    }

    #[test]
    fn test_entry_to_string_at() {
        let mut c = folds();
        c.set_preview(0, leaf(&["acc"], 2, 10.0)).unwrap();
        c.set_preview(1, leaf(&["acc"], 2, 20.0)).unwrap();

        assert_eq!(c.entry_to_string_at(1, 1).unwrap(), "3,1,21");
        assert!(c.entry_to_string_at(2, 0).is_err());
        assert!(c.entry_to_string_at(0, 2).is_err());
    }

    #[test]
    fn test_entry_data_on_empty_collection() {
        let c = folds();
        assert!(matches!(c.entry_data(0), Err(Error::EmptyCollection)));
        assert_eq!(c.entry_to_string(0).unwrap(), "");
    }

    #[test]
    fn test_describe_indents_entries() {
        let mut c = folds();
        c.set_preview(0, leaf(&["acc"], 1, 0.5)).unwrap();

        let mut out = String::new();
        c.describe(&mut out, 2).unwrap();
        assert_eq!(out, "id,fold,acc\n  0,0,0.5");
        assert_eq!(c.to_string(), "id,fold,acc\n0,0,0.5");
    }

    #[test]
    fn test_collection_is_a_group() {
        let mut c = folds();
        c.set_preview(0, leaf(&["acc"], 1, 0.0)).unwrap();

        let group = c.as_group().unwrap();
        assert_eq!(group.slot_count(), 1);
        assert!(group.preview_at(0).is_some());
        assert!(group.preview_at(1).is_none());
    }

    #[test]
    fn test_builder_sets_varied_param() {
        let c = PreviewCollection::<LeafPreview>::builder("id", "param")
            .task_class(TaskClass::new("sweep"))
            .varied_param(VariedParameter::new("budget", vec![0.1, 0.2]))
            .build();

        assert_eq!(c.varied_param_name(), Some("budget"));
        assert_eq!(c.varied_param_values(), Some(&[0.1, 0.2][..]));
        assert_eq!(c.task_class().name(), "sweep");
        assert!(c.is_empty());
    }

    #[test]
    fn test_serializes_nested_previews() {
        let mut c = folds();
        c.set_preview(0, leaf(&["acc"], 2, 0.5)).unwrap();

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["ordering_name"], "id");
        assert_eq!(json["min_entry_num"], 2);
        assert_eq!(json["task_class"], "cross-validation");
        assert_eq!(json["previews"][0]["rows"][1][0], 1.5);
        assert_eq!(json["measurement_names"], serde_json::json!(["id", "fold", "acc"]));
    }

    /// Claims one entry but cannot render it.
    #[derive(Debug)]
    struct Unreadable(TaskClass);

    impl Preview for Unreadable {
        fn num_entries(&self) -> usize {
            1
        }

        fn measurement_name_count(&self) -> usize {
            1
        }

        fn measurement_name(&self, index: usize) -> Option<&str> {
            (index == 0).then_some("acc")
        }

        fn entry_data(&self, _entry_index: usize) -> Result<Vec<f64>> {
            Ok(vec![0.0])
        }

        fn entry_to_string(&self, entry_index: usize) -> Result<String> {
            Err(Error::EntryOutOfRange {
                index: entry_index,
                len: 0,
            })
        }

        fn task_class(&self) -> &TaskClass {
            &self.0
        }
    }

    #[test]
    fn test_describe_surfaces_child_render_error() {
        let mut c = PreviewCollection::new("id", "fold", TaskClass::CROSS_VALIDATION);
        c.set_preview(0, Unreadable(TaskClass::CROSS_VALIDATION)).unwrap();

        let mut out = String::new();
        let err = c.describe(&mut out, 0).unwrap_err();
        assert!(matches!(err, Error::EntryOutOfRange { index: 0, len: 0 }));

        let mut rendered = String::new();
        let result = fmt::write(&mut rendered, format_args!("{c}"));
        assert!(result.is_err());
    }
}
