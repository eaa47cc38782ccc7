//! Demonstration blood cell classifier.
//!
//! [`classifier::MockClassifier`] fabricates a ranked distribution over seven
//! blood cell types; [`handlers`] exposes it over HTTP for an upload page.

pub mod classifier;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod session;
pub mod telemetry;

pub use classifier::{ClassifierConfig, MockClassifier, SelectionStrategy};
pub use error::{ApiError, ClassifyError};
pub use models::{CellType, CellTypeInfo, ClassificationResult, ModelMetadata, Prediction};
pub use session::AnalysisSession;
