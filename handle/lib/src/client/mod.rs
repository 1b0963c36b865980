//! Authenticated client for the Handle REST API.

mod executor;

pub use executor::{HandleClient, HandleClientBuilder};
