//! Request and response types seen by handlers.

use bytes::Bytes;
use http_body_util::Full;

/// The request type handed to the router.
///
/// The body has already been collected by whatever transport sits in front.
pub type Request = http::Request<Bytes>;

/// The response type produced by the router.
pub type Response = http::Response<Full<Bytes>>;
