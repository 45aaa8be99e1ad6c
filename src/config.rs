//! Collection configuration
//!
//! Naming and sweep metadata for a [`PreviewCollection`], loadable from JSON
//! so the pipeline that produces previews can be configured from a file.
//!
//! ```json
//! {
//!   "ordering_name": "entry id",
//!   "index_name": "fold",
//!   "task_class": "cross-validation",
//!   "varied_param": { "name": "budget", "values": [0.1, 0.2, 0.5] }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collection::PreviewCollection;
use crate::preview::TaskClass;
use crate::{Error, Result};

/// A parameter scanned by a sweep, with its values in slot order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariedParameter {
    name: String,
    values: Vec<f64>,
}

impl VariedParameter {
    /// Create a varied parameter.
    ///
    /// # Arguments
    ///
    /// * `name` - Parameter name (e.g., "budget")
    /// * `values` - Scanned values; value `i` belongs to slot `i`
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Get the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the scanned values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Configuration of an empty preview collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// Label of the interlaced row id column.
    pub ordering_name: String,
    /// Label of the child slot id column.
    pub index_name: String,
    /// Task type that produces the collection.
    #[serde(default)]
    pub task_class: TaskClass,
    /// Sweep metadata, if the slots are parameter values.
    #[serde(default)]
    pub varied_param: Option<VariedParameter>,
}

impl CollectionConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the JSON is malformed and [`Error::Config`]
    /// if validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the errors
    /// of [`from_json`](Self::from_json).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Check that labels are non-empty and parameter values are finite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.ordering_name.trim().is_empty() {
            return Err(Error::Config("ordering_name must not be empty".to_string()));
        }
        if self.index_name.trim().is_empty() {
            return Err(Error::Config("index_name must not be empty".to_string()));
        }
        if let Some(param) = &self.varied_param {
            if param.name().trim().is_empty() {
                return Err(Error::Config("varied_param.name must not be empty".to_string()));
            }
            if let Some(value) = param.values().iter().find(|v| !v.is_finite()) {
                return Err(Error::Config(format!(
                    "varied_param.values must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Build the empty collection this configuration describes.
    #[must_use]
    pub fn into_collection<T>(self) -> PreviewCollection<T> {
        let builder = PreviewCollection::<T>::builder(self.ordering_name, self.index_name)
            .task_class(self.task_class);
        match self.varied_param {
            Some(param) => builder.varied_param(param).build(),
            None => builder.build(),
        }
    }
}
