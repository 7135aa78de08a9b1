//! HTTP transport adapter for the Palaver conversation service.
//!
//! Implements [`palaver_core::conversation::ChatTransport`] over the
//! service's REST API: request marshalling, bearer-token injection, and the
//! flattening of transport-level and application-level failures into the
//! core's single [`palaver_core::ChatError`] channel.

pub mod config;
mod dto;
pub mod http;

pub use config::ChatApiConfig;
pub use http::HttpChatTransport;
