//! REST API client for n8n
//!
//! This crate talks to the n8n public API (`/api/v1`) of one or more named
//! instances. [`RestClient`] maps each endpoint onto a single HTTP request
//! against one instance, [`EnvironmentManager`] holds the configured
//! instances and [`N8nApiWrapper`] resolves the instance per call and
//! implements [`n8n_client_api::WorkflowClientApi`].

pub mod auth;
pub mod client;
pub mod environment;
pub mod error;
pub mod wrapper;

pub use auth::*;
pub use client::*;
pub use environment::*;
pub use error::*;
pub use wrapper::*;
