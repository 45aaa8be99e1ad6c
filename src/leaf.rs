//! Leaf Preview - a flat checkpoint × measurement table

use serde::{Deserialize, Serialize};

use crate::preview::{join_values, Preview, TaskClass};
use crate::{Error, Result};

/// Flat table of measurements: rows are checkpoints, columns are named
/// measurements.
///
/// Every row holds exactly one value per measurement name. The invariant is
/// checked on construction, on [`push_entry`](Self::push_entry), and when
/// deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LeafPreviewData")]
pub struct LeafPreview {
    measurement_names: Vec<String>,
    rows: Vec<Vec<f64>>,
    task_class: TaskClass,
}

#[derive(Deserialize)]
struct LeafPreviewData {
    measurement_names: Vec<String>,
    rows: Vec<Vec<f64>>,
    #[serde(default)]
    task_class: TaskClass,
}

impl TryFrom<LeafPreviewData> for LeafPreview {
    type Error = Error;

    fn try_from(data: LeafPreviewData) -> Result<Self> {
        Ok(Self::new(data.measurement_names, data.rows)?.with_task_class(data.task_class))
    }
}

impl LeafPreview {
    /// Create a leaf preview from measurement names and rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowLength`] if a row's width differs from the number
    /// of measurement names.
    pub fn new<I, S>(measurement_names: I, rows: Vec<Vec<f64>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let measurement_names: Vec<String> =
            measurement_names.into_iter().map(Into::into).collect();
        for (row, values) in rows.iter().enumerate() {
            check_width(row, measurement_names.len(), values.len())?;
        }

        Ok(Self {
            measurement_names,
            rows,
            task_class: TaskClass::default(),
        })
    }

    /// Create a leaf preview with names but no entries yet.
    #[must_use]
    pub fn empty<I, S>(measurement_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            measurement_names: measurement_names.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            task_class: TaskClass::default(),
        }
    }

    /// Tag the preview with the task type that produced it.
    #[must_use]
    pub fn with_task_class(mut self, task_class: TaskClass) -> Self {
        self.task_class = task_class;
        self
    }

    /// Append one checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowLength`] if `values` does not hold one value per
    /// measurement name.
    pub fn push_entry(&mut self, values: Vec<f64>) -> Result<()> {
        check_width(self.rows.len(), self.measurement_names.len(), values.len())?;
        self.rows.push(values);
        Ok(())
    }

    /// Get all rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Get the measurement names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.measurement_names
    }

    fn row(&self, entry_index: usize) -> Result<&[f64]> {
        self.rows
            .get(entry_index)
            .map(Vec::as_slice)
            .ok_or(Error::EntryOutOfRange {
                index: entry_index,
                len: self.rows.len(),
            })
    }
}

fn check_width(row: usize, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::RowLength {
            row,
            expected,
            found,
        })
    }
}

impl Preview for LeafPreview {
    fn num_entries(&self) -> usize {
        self.rows.len()
    }

    fn measurement_name_count(&self) -> usize {
        self.measurement_names.len()
    }

    fn measurement_name(&self, index: usize) -> Option<&str> {
        self.measurement_names.get(index).map(String::as_str)
    }

    fn entry_data(&self, entry_index: usize) -> Result<Vec<f64>> {
        self.row(entry_index).map(<[f64]>::to_vec)
    }

    fn data(&self) -> Result<Vec<Vec<f64>>> {
        Ok(self.rows.clone())
    }

    fn entry_to_string(&self, entry_index: usize) -> Result<String> {
        self.row(entry_index).map(join_values)
    }

    fn task_class(&self) -> &TaskClass {
        &self.task_class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_preview_new() {
        let leaf = LeafPreview::new(["instances", "accuracy"], vec![vec![100.0, 0.5]]).unwrap();
        assert_eq!(leaf.num_entries(), 1);
        assert_eq!(leaf.measurement_name_count(), 2);
        assert_eq!(leaf.measurement_name(1), Some("accuracy"));
        assert_eq!(leaf.measurement_name(2), None);
        assert_eq!(leaf.measurement_names(), vec!["instances", "accuracy"]);
        assert_eq!(leaf.entry_to_string(0).unwrap(), "100,0.5");
    }

    #[test]
    fn test_leaf_preview_rejects_ragged_rows() {
        let err = LeafPreview::new(["a", "b"], vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::RowLength {
                row: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_leaf_preview_push_entry() {
        let mut leaf = LeafPreview::empty(["acc"]);
        assert_eq!(leaf.num_entries(), 0);

        leaf.push_entry(vec![0.9]).unwrap();
        assert!(leaf.push_entry(vec![0.9, 0.1]).is_err());
        assert_eq!(leaf.rows(), &[vec![0.9]]);
    }

    #[test]
    fn test_leaf_preview_entry_out_of_range() {
        let leaf = LeafPreview::new(["acc"], vec![vec![0.9]]).unwrap();
        assert!(matches!(
            leaf.entry_data(1),
            Err(Error::EntryOutOfRange { index: 1, len: 1 })
        ));
        assert!(leaf.entry_to_string(3).is_err());
    }

    #[test]
    fn test_leaf_preview_task_class() {
        let leaf = LeafPreview::empty(["acc"]).with_task_class(TaskClass::new("holdout"));
        assert_eq!(leaf.task_class().name(), "holdout");
        assert!(leaf.as_group().is_none());
    }

    #[test]
    fn test_leaf_preview_deserialize_validates() {
        let ok = r#"{"measurement_names":["a"],"rows":[[1.0],[2.0]]}"#;
        let leaf: LeafPreview = serde_json::from_str(ok).unwrap();
        assert_eq!(leaf.num_entries(), 2);
        assert_eq!(leaf.task_class(), &TaskClass::CROSS_VALIDATION);

        let ragged = r#"{"measurement_names":["a"],"rows":[[1.0, 2.0]]}"#;
        assert!(serde_json::from_str::<LeafPreview>(ragged).is_err());
    }
}
