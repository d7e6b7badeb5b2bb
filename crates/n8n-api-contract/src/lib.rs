//! n8n REST API contract types and validation
//!
//! This crate defines the wire types exchanged with the n8n public API
//! (`/api/v1`) together with the validation that shapes a user supplied
//! workflow definition into a payload the API accepts. These types are
//! shared between the REST client, the mock client and the CLI.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
pub use validation::*;
