mod preview_service;

#[cfg(test)]
pub(crate) use preview_service::test_config;
pub use preview_service::{PreviewCard, PreviewService, TemplateError};
