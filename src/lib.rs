//! # Trueno-Preview: Cross-Validation Preview Aggregation
//!
//! **Version**: 0.1.0
//!
//! Trueno-Preview combines the intermediate results ("previews") of repeated
//! experiment runs, such as cross-validation folds over a parameter sweep,
//! into one interlaced table and into per-parameter-value mean and standard
//! deviation tables.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke**: Children must share one measurement-name contract, and
//!   only the common prefix of entries is exposed
//! - **Jidoka**: A rejected preview aborts only its own call; the collection
//!   stays valid
//! - **Genchi Genbutsu**: Incomplete folds are excluded, never partially
//!   averaged
//!
//! ## Example Usage
//!
//! ```rust
//! use trueno_preview::{LeafPreview, PreviewCollection, TaskClass, VariedParameter};
//!
//! # fn main() -> trueno_preview::Result<()> {
//! let param = VariedParameter::new("budget", vec![0.1, 0.5]);
//! let mut folds = PreviewCollection::<PreviewCollection<LeafPreview>>::builder("id", "fold")
//!     .varied_param(param.clone())
//!     .build();
//!
//! for (fold, offset) in [0.0, 2.0].into_iter().enumerate() {
//!     let mut values = PreviewCollection::<LeafPreview>::builder("id", "param")
//!         .varied_param(param.clone())
//!         .build();
//!     values.set_preview(0, LeafPreview::new(["acc"], vec![vec![10.0 + offset]])?)?;
//!     values.set_preview(1, LeafPreview::new(["acc"], vec![vec![30.0 - offset]])?)?;
//!     folds.set_preview(fold, values)?;
//! }
//!
//! let means = folds.calculate_mean_preview()?;
//! assert_eq!(means.header_to_string(), "mean preview entry id,parameter value id,acc,[std] acc");
//! println!("{means}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod leaf;
pub mod preview;

pub use aggregate::MeanPreviews;
pub use collection::{PreviewCollection, PreviewCollectionBuilder};
pub use config::{CollectionConfig, VariedParameter};
pub use error::{Error, Result};
pub use leaf::LeafPreview;
pub use preview::{Preview, PreviewGroup, TaskClass};
