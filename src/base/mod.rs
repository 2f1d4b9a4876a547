//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): network error codes matching Chromium's `net_error_list.h`
//! - [`HttpError`](error::HttpError): the error returned by dispatch and response accessors
//! - [`context`]: I/O context and deadline helpers

pub mod context;
pub mod error;
pub mod neterror;
