//! placemap-core: document model, three-tier session store, validation,
//! derived statistics, viewport math, and export shaping for place
//! datasets.
//!
//! External collaborators (geocoding, LLM structuring) live in their own
//! crates and only ever touch this one through [`Document`] values and the
//! [`DocumentStore`] API.

pub mod app_config;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod normalize;
pub mod stats;
pub mod store;
pub mod validate;
pub mod viewport;

pub use app_config::AppConfig;
pub use document::{Document, FilterConfig, GeoPoint, LocationItem};
pub use error::{ConfigError, ValidationError};
pub use store::{DocumentStore, SessionSnapshot, Tier};
