pub mod client;
pub mod error;
pub mod structure;

pub use client::ExtractClient;
pub use error::ExtractError;
pub use structure::{edit, parse_reply, structure};
