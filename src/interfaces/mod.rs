//! Inbound boundaries: batch CSV files and the REST API.

pub mod csv;
pub mod http;
