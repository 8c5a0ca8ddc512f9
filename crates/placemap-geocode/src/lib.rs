pub mod client;
pub mod error;
pub mod resolve;
mod retry;

pub use client::{GeocodeResult, GeocoderClient};
pub use error::GeocodeError;
pub use resolve::{resolve, update_document_coordinates, BatchOutcome};
