//! Processing phases of an HTTP exchange
//!
//! Envoy sends at most one message per phase slot, in request-then-response
//! order. Body phases may recur when the filter streams chunks; the slot
//! index stays stable so per-phase timings overwrite rather than accumulate.

use std::fmt;

use crate::proto::envoy::service::ext_proc::v3::processing_request;

/// Number of phase slots in a full exchange
pub const PHASE_COUNT: usize = 6;

/// One phase of the proxied HTTP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    RequestHeaders,
    RequestBody,
    RequestTrailers,
    ResponseHeaders,
    ResponseBody,
    ResponseTrailers,
}

impl Phase {
    /// Stable slot index, 0..[`PHASE_COUNT`]
    pub fn index(self) -> usize {
        match self {
            Phase::RequestHeaders => 0,
            Phase::RequestBody => 1,
            Phase::RequestTrailers => 2,
            Phase::ResponseHeaders => 3,
            Phase::ResponseBody => 4,
            Phase::ResponseTrailers => 5,
        }
    }

    /// True for phases on the downstream-to-upstream half
    pub fn is_request_side(self) -> bool {
        matches!(
            self,
            Phase::RequestHeaders | Phase::RequestBody | Phase::RequestTrailers
        )
    }

    /// True for phases on the upstream-to-downstream half
    pub fn is_response_side(self) -> bool {
        !self.is_request_side()
    }

    /// Decode the phase from a request oneof variant
    pub fn from_request(request: &processing_request::Request) -> Self {
        use processing_request::Request;
        match request {
            Request::RequestHeaders(_) => Phase::RequestHeaders,
            Request::RequestBody(_) => Phase::RequestBody,
            Request::RequestTrailers(_) => Phase::RequestTrailers,
            Request::ResponseHeaders(_) => Phase::ResponseHeaders,
            Request::ResponseBody(_) => Phase::ResponseBody,
            Request::ResponseTrailers(_) => Phase::ResponseTrailers,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::RequestHeaders => "request_headers",
            Phase::RequestBody => "request_body",
            Phase::RequestTrailers => "request_trailers",
            Phase::ResponseHeaders => "response_headers",
            Phase::ResponseBody => "response_body",
            Phase::ResponseTrailers => "response_trailers",
        };
        f.write_str(name)
    }
}
