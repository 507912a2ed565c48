//! HTTP implementation of the assistant's Backend Gateway.

pub mod http;

pub use http::HttpGateway;
