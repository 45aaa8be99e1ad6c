//! Cross-fold mean / standard-deviation aggregation
//!
//! Collapses one level of fold nesting:
//!
//! ```text
//! folds ─┬─ fold 0 ─┬─ param 0: preview      mean ─┬─ param 0: mean ++ [std]
//!        │          └─ param 1: preview   ──►      └─ param 1: mean ++ [std]
//!        └─ fold 1 ─┬─ param 0: preview
//!                   └─ param 1: preview
//! ```
//!
//! Two passes per parameter value: sum then divide, then sum of squared
//! deviations then divide and take the root (population standard deviation).
//! Folds that did not report every parameter value are left out of both
//! passes.

use std::fmt;

use tracing::{debug, instrument, warn};

use crate::collection::{PreviewCollection, PreviewCollectionBuilder};
use crate::leaf::LeafPreview;
use crate::preview::{Preview, PreviewGroup, TaskClass};
use crate::{Error, Result};

/// Ordering label of a mean collection.
pub const MEAN_ORDERING_NAME: &str = "mean preview entry id";

/// Index label of a mean collection.
pub const MEAN_INDEX_NAME: &str = "parameter value id";

/// Prefix of standard-deviation measurement names.
pub const STD_PREFIX: &str = "[std] ";

/// Synthetic columns a fold collection prepends to its children's names.
const FOLD_SYNTHETIC_COLUMNS: usize = 2;

/// Result of [`PreviewCollection::calculate_mean_preview`].
#[derive(Debug)]
pub enum MeanPreviews<'a, T> {
    /// Children are not collections: nothing to average, the input is the
    /// answer.
    Unchanged(&'a PreviewCollection<T>),
    /// One mean/std preview per parameter value.
    Averaged(PreviewCollection<LeafPreview>),
}

impl<'a, T> MeanPreviews<'a, T> {
    /// Check if a nesting level was averaged.
    #[must_use]
    pub const fn is_averaged(&self) -> bool {
        matches!(self, Self::Averaged(_))
    }

    /// Get the averaged collection, if one was computed.
    #[must_use]
    pub const fn averaged(&self) -> Option<&PreviewCollection<LeafPreview>> {
        match self {
            Self::Averaged(means) => Some(means),
            Self::Unchanged(_) => None,
        }
    }

    /// Take the averaged collection, if one was computed.
    #[must_use]
    pub fn into_averaged(self) -> Option<PreviewCollection<LeafPreview>> {
        match self {
            Self::Averaged(means) => Some(means),
            Self::Unchanged(_) => None,
        }
    }

    /// Get the input collection, if it was returned unchanged.
    #[must_use]
    pub const fn unchanged(&self) -> Option<&'a PreviewCollection<T>> {
        match self {
            Self::Unchanged(input) => Some(*input),
            Self::Averaged(_) => None,
        }
    }

    /// Header line of the report.
    #[must_use]
    pub fn header_to_string(&self) -> String {
        match self {
            Self::Unchanged(input) => input.header_to_string(),
            Self::Averaged(means) => means.header_to_string(),
        }
    }
}

impl<T: Preview> MeanPreviews<'_, T> {
    fn inner(&self) -> &dyn Preview {
        match self {
            Self::Unchanged(input) => *input,
            Self::Averaged(means) => means,
        }
    }
}

impl<T: Preview> Preview for MeanPreviews<'_, T> {
    fn num_entries(&self) -> usize {
        self.inner().num_entries()
    }

    fn measurement_name_count(&self) -> usize {
        self.inner().measurement_name_count()
    }

    fn measurement_name(&self, index: usize) -> Option<&str> {
        self.inner().measurement_name(index)
    }

    fn entry_data(&self, entry_index: usize) -> Result<Vec<f64>> {
        self.inner().entry_data(entry_index)
    }

    fn entry_to_string(&self, entry_index: usize) -> Result<String> {
        self.inner().entry_to_string(entry_index)
    }

    fn task_class(&self) -> &TaskClass {
        self.inner().task_class()
    }

    fn as_group(&self) -> Option<&dyn PreviewGroup> {
        self.inner().as_group()
    }
}

impl<T: Preview> fmt::Display for MeanPreviews<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged(input) => fmt::Display::fmt(input, f),
            Self::Averaged(means) => fmt::Display::fmt(means, f),
        }
    }
}

impl<T: Preview> PreviewCollection<T> {
    /// Average one level of fold nesting.
    ///
    /// For a collection of folds, each a collection indexed by parameter
    /// value, returns one preview per parameter value holding the mean of
    /// every measurement at every checkpoint over the complete folds,
    /// followed by the population standard deviation of each measurement
    /// (names prefixed with `"[std] "`).
    ///
    /// A fold is complete if it has exactly one slot per varied parameter
    /// value; other folds are excluded. Without any complete fold every
    /// output value is NaN.
    ///
    /// If the collection is empty or its children are not collections, the
    /// collection itself is returned as [`MeanPreviews::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingVariedParameter`] if the children are
    /// collections but no parameter values are set, and propagates entry
    /// access errors from the folds.
    #[instrument(level = "debug", skip(self), fields(folds = self.len()))]
    pub fn calculate_mean_preview(&self) -> Result<MeanPreviews<'_, T>> {
        let Some(first) = self.previews().first() else {
            return Ok(MeanPreviews::Unchanged(self));
        };
        if first.as_group().is_none() {
            return Ok(MeanPreviews::Unchanged(self));
        }

        let varied = self.varied_param().ok_or(Error::MissingVariedParameter)?;
        let num_param_values = varied.values().len();

        let complete_folds: Vec<&dyn PreviewGroup> = self
            .previews()
            .iter()
            .enumerate()
            .filter_map(|(slot, fold)| {
                let group = fold.as_group()?;
                if group.slot_count() == num_param_values {
                    Some(group)
                } else {
                    debug!(
                        fold = slot,
                        slots = group.slot_count(),
                        expected = num_param_values,
                        "excluding incomplete fold"
                    );
                    None
                }
            })
            .collect();

        // Only complete folds bound the checkpoint count; without any, fall
        // back to the interlaced share so the NaN rows stay visible.
        let entries_per_preview = complete_folds
            .iter()
            .filter_map(|fold| min_slot_entries(*fold))
            .min()
            .unwrap_or_else(|| {
                warn!(
                    folds = self.len(),
                    "no complete fold to average, mean previews will be NaN"
                );
                (self.num_entries() / self.len())
                    .checked_div(num_param_values)
                    .unwrap_or(0)
            });

        let base_names: Vec<String> = self
            .required_measurement_names()
            .iter()
            .skip(FOLD_SYNTHETIC_COLUMNS)
            .cloned()
            .collect();

        let mut means =
            PreviewCollectionBuilder::<LeafPreview>::new(MEAN_ORDERING_NAME, MEAN_INDEX_NAME)
                .task_class(TaskClass::CROSS_VALIDATION)
                .varied_param(varied.clone())
                .build();

        for param in 0..num_param_values {
            let preview =
                mean_preview_for_param(&complete_folds, param, entries_per_preview, &base_names)?;
            means.set_preview(param, preview)?;
        }

        debug!(
            complete_folds = complete_folds.len(),
            param_values = num_param_values,
            entries_per_preview,
            "averaged folds"
        );
        Ok(MeanPreviews::Averaged(means))
    }
}

fn min_slot_entries(fold: &dyn PreviewGroup) -> Option<usize> {
    (0..fold.slot_count())
        .filter_map(|slot| fold.preview_at(slot))
        .map(|preview| preview.num_entries())
        .min()
}

fn mean_preview_for_param(
    folds: &[&dyn PreviewGroup],
    param: usize,
    entries: usize,
    base_names: &[String],
) -> Result<LeafPreview> {
    let fold_previews: Vec<&dyn Preview> = folds
        .iter()
        .filter_map(|fold| fold.preview_at(param))
        .collect();

    let mut acc = FoldAccumulator::new(entries, base_names.len());
    for preview in &fold_previews {
        acc.add(*preview)?;
    }
    acc.finish_mean();
    for preview in &fold_previews {
        acc.add_squared_deviation(*preview)?;
    }
    acc.finish_std();

    let names = base_names
        .iter()
        .cloned()
        .chain(base_names.iter().map(|name| format!("{STD_PREFIX}{name}")));

    Ok(LeafPreview::new(names, acc.into_rows())?.with_task_class(TaskClass::CROSS_VALIDATION))
}

/// Per-entry accumulator for one parameter value.
///
/// Each row is `[mean_0 .. mean_w, var_0 .. var_w]`. Storage is owned here,
/// fold rows are only read.
#[derive(Debug)]
struct FoldAccumulator {
    rows: Vec<Vec<f64>>,
    width: usize,
    folds: usize,
}

impl FoldAccumulator {
    fn new(entries: usize, width: usize) -> Self {
        Self {
            rows: vec![vec![0.0; width * 2]; entries],
            width,
            folds: 0,
        }
    }

    fn add(&mut self, preview: &dyn Preview) -> Result<()> {
        for (entry, row) in self.rows.iter_mut().enumerate() {
            let values = preview.entry_data(entry)?;
            for (sum, value) in row[..self.width].iter_mut().zip(&values) {
                *sum += value;
            }
        }
        self.folds += 1;
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish_mean(&mut self) {
        let folds = self.folds as f64;
        for row in &mut self.rows {
            for sum in &mut row[..self.width] {
                *sum /= folds;
            }
        }
    }

    fn add_squared_deviation(&mut self, preview: &dyn Preview) -> Result<()> {
        for (entry, row) in self.rows.iter_mut().enumerate() {
            let values = preview.entry_data(entry)?;
            let (mean, var) = row.split_at_mut(self.width);
            for ((m, v), value) in mean.iter().zip(var.iter_mut()).zip(&values) {
                let diff = m - value;
                *v += diff * diff;
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish_std(&mut self) {
        let folds = self.folds as f64;
        for row in &mut self.rows {
            for var in &mut row[self.width..] {
                *var = (*var / folds).sqrt();
            }
        }
    }

    fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}
