//! Rejects a request whose digest is already in flight
//!
//! Pairs with the digest processor running earlier in the chain: the
//! request digest header keys an in-flight map, and a concurrent duplicate
//! gets a 409 naming the request id that holds the slot. The entry is
//! released when the winning exchange's response completes.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::json;

use crate::context::RequestContext;
use crate::error::Result;
use crate::processor::RequestProcessor;
use crate::processors::digest::REQUEST_DIGEST_HEADER;

pub struct DedupProcessor {
    /// digest -> request id currently holding the slot
    inflight: Mutex<HashMap<String, String>>,
}

impl DedupProcessor {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    fn release(&self, ctx: &RequestContext) {
        if let Some(digest) = ctx.request_header(REQUEST_DIGEST_HEADER) {
            self.inflight.lock().remove(digest);
        }
    }
}

impl Default for DedupProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestProcessor for DedupProcessor {
    fn name(&self) -> &str {
        "dedup"
    }

    fn process_request_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        let Some(digest) = ctx.request_header(REQUEST_DIGEST_HEADER).map(String::from)
        else {
            return Ok(());
        };
        let holder = {
            let mut inflight = self.inflight.lock();
            match inflight.get(&digest) {
                Some(request_id) => Some(request_id.clone()),
                None => {
                    inflight.insert(digest, ctx.request_id().to_string());
                    None
                }
            }
        };
        if let Some(request_id) = holder {
            let body = json!({
                "message": "Duplicate request already in flight",
                "requestId": request_id,
            })
            .to_string();
            ctx.cancel_request_with_body(409, &body);
        }
        Ok(())
    }

    fn process_response_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        if ctx.stream_complete() {
            self.release(ctx);
        }
        Ok(())
    }

    fn process_response_body(&self, ctx: &mut RequestContext, _body: &str) -> Result<()> {
        if ctx.stream_complete() {
            self.release(ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::phase::Phase;
    use crate::proto::envoy::config::core::v3::{HeaderMap, HeaderValue};

    fn ctx_with_digest(request_id: &str, digest: &str) -> RequestContext {
        let mut ctx = RequestContext::new("x-request-id");
        ctx.initialize_request(&HeaderMap {
            headers: vec![
                HeaderValue {
                    key: "x-request-id".to_string(),
                    value: request_id.to_string(),
                    raw_value: Vec::new(),
                },
                HeaderValue {
                    key: REQUEST_DIGEST_HEADER.to_string(),
                    value: digest.to_string(),
                    raw_value: Vec::new(),
                },
            ],
        });
        ctx
    }

    #[test]
    fn test_duplicate_rejected_with_holder_id() {
        let processor = DedupProcessor::new();

        let mut first = ctx_with_digest("req-1", "abc");
        processor
            .process_request_headers(&mut first, &HashMap::new())
            .unwrap();
        assert!(!first.is_cancelled());

        let mut second = ctx_with_digest("req-2", "abc");
        processor
            .process_request_headers(&mut second, &HashMap::new())
            .unwrap();
        assert!(second.is_cancelled());

        let response = second.response_for(Phase::RequestHeaders);
        let crate::proto::envoy::service::ext_proc::v3::processing_response::Response::ImmediateResponse(
            immediate,
        ) = response.response.unwrap()
        else {
            unreachable!()
        };
        assert_eq!(immediate.status.unwrap().code, 409);
        let body: serde_json::Value = serde_json::from_slice(&immediate.body).unwrap();
        assert_eq!(body["requestId"], "req-1");
    }

    #[test]
    fn test_slot_released_on_response_completion() {
        let processor = DedupProcessor::new();

        let mut first = ctx_with_digest("req-1", "abc");
        processor
            .process_request_headers(&mut first, &HashMap::new())
            .unwrap();

        first.begin_phase(Phase::ResponseHeaders);
        first.set_end_of_stream(true);
        processor
            .process_response_headers(&mut first, &HashMap::new())
            .unwrap();

        let mut retry = ctx_with_digest("req-3", "abc");
        processor
            .process_request_headers(&mut retry, &HashMap::new())
            .unwrap();
        assert!(!retry.is_cancelled());
    }

    #[test]
    fn test_requests_without_digest_pass_through() {
        let processor = DedupProcessor::new();
        let mut ctx = RequestContext::new("x-request-id");
        processor
            .process_request_headers(&mut ctx, &HashMap::new())
            .unwrap();
        assert!(!ctx.is_cancelled());
        assert!(processor.inflight.lock().is_empty());
    }
}
