//! Clients for the portal's consortium CRUD routes.

pub mod api;
pub mod error;
pub mod http;
pub mod memory;

pub use api::ConsortiumApi;
pub use error::{ClientError, Result};
pub use http::HttpConsortiumApi;
pub use memory::{ApiCall, MemoryConsortiumApi};
