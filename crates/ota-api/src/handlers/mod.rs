//! HTTP request handlers for the OTA API
//!
//! Handlers are thin: they parse the request, call the store, and shape the
//! response the devices expect.

pub mod firmware;
pub mod upload;
pub mod version;
