//! Social preview (Open Graph) images.
//!
//! `GET /api/og` is public and a pure function of its query parameters.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::PreviewService;
