// Copymark library
// Batch copyright watermarking with embedded provenance metadata

pub mod batch;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod watermark;
