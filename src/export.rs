//! Columnar export of previews (Arrow)
//!
//! Any [`Preview`] can be turned into a `RecordBatch` with one non-null
//! `Float64` column per measurement name, so reports can be handed to Arrow
//! consumers instead of being parsed back from text.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::preview::Preview;
use crate::Result;

/// Trait for exporting previews as Arrow record batches
pub trait PreviewExport {
    /// Materialize every entry into a `RecordBatch`.
    ///
    /// Columns follow the measurement names in order; rows follow the
    /// entries in order (the interlaced order for collections).
    ///
    /// # Errors
    ///
    /// Returns error if an entry cannot be materialized or the batch cannot
    /// be assembled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trueno_preview::export::PreviewExport;
    /// use trueno_preview::LeafPreview;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let leaf = LeafPreview::new(["step", "acc"], vec![vec![1.0, 0.5], vec![2.0, 0.75]])?;
    /// let batch = leaf.to_record_batch()?;
    /// assert_eq!(batch.num_rows(), 2);
    /// assert_eq!(batch.num_columns(), 2);
    /// # Ok(())
    /// # }
    /// ```
    fn to_record_batch(&self) -> Result<RecordBatch>;
}

impl<P: Preview + ?Sized> PreviewExport for P {
    fn to_record_batch(&self) -> Result<RecordBatch> {
        let data = self.data()?;
        let names = self.measurement_names();

        let fields: Vec<Field> = names
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, false))
            .collect();

        // Missing trailing values (ragged external previews) export as NaN
        let columns: Vec<ArrayRef> = (0..names.len())
            .map(|column| {
                let values = data
                    .iter()
                    .map(|row| row.get(column).copied().unwrap_or(f64::NAN));
                Arc::new(Float64Array::from_iter_values(values)) as ArrayRef
            })
            .collect();

        let options = RecordBatchOptions::new().with_row_count(Some(data.len()));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;
        Ok(batch)
    }
}
