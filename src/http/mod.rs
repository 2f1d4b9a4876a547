//! Request and response model.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`headers`] | Ordered, multi-valued header bag |
//! | [`query`] | Query-string pairs and bracket-key flattening |
//! | [`options`] | Typed request options and merge rules |
//! | [`requestbody`] | Body formats, payloads, encoded bodies |
//! | [`multipart`] | `multipart/form-data` forms |
//! | [`digestauth`] | Digest challenge parsing and responses |
//! | [`request`] | Materialized outbound request |
//! | [`response`] | Buffered inbound response |
//! | [`stats`] | Per-dispatch transfer statistics |

pub mod digestauth;
pub mod headers;
pub mod multipart;
pub mod options;
pub mod query;
pub mod request;
pub mod requestbody;
pub mod response;
pub mod stats;

pub use headers::HeaderBag;
pub use options::{Auth, AuthScheme, RequestOptions};
pub use query::QueryMap;
pub use request::OutboundRequest;
pub use requestbody::{BodyFormat, Payload, RequestBody};
pub use response::InboundResponse;
pub use stats::TransferStats;
