//! Answers `/echo`-prefixed paths directly, before the upstream sees them

use std::collections::HashMap;

use serde_json::json;
use tracing::info;

use crate::context::RequestContext;
use crate::error::Result;
use crate::processor::RequestProcessor;

pub struct EchoProcessor;

impl EchoProcessor {
    fn echo_headers(ctx: &RequestContext) -> HashMap<String, String> {
        ctx.request_headers()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl RequestProcessor for EchoProcessor {
    fn name(&self) -> &str {
        "echo"
    }

    fn process_request_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        if ctx.path().starts_with("/echo") && ctx.stream_complete() {
            info!(path = ctx.path(), "echoing before upstream");
            let body = json!({ "path": ctx.path() }).to_string();
            let headers = Self::echo_headers(ctx);
            ctx.cancel_request_full(200, Some(&headers), &body);
        }
        Ok(())
    }

    fn process_request_body(&self, ctx: &mut RequestContext, body: &str) -> Result<()> {
        if ctx.path().starts_with("/echo") {
            info!(path = ctx.path(), "echoing before upstream");
            let body = json!({ "path": ctx.path(), "body": body }).to_string();
            let headers = Self::echo_headers(ctx);
            ctx.cancel_request_full(200, Some(&headers), &body);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;
    use crate::phase::Phase;
    use crate::proto::envoy::config::core::v3::{HeaderMap, HeaderValue};
    use crate::proto::envoy::service::ext_proc::v3::processing_response;

    fn ctx_for_path(path: &str) -> RequestContext {
        let mut ctx = RequestContext::new("x-request-id");
        ctx.initialize_request(&HeaderMap {
            headers: vec![HeaderValue {
                key: ":path".to_string(),
                value: path.to_string(),
                raw_value: Vec::new(),
            }],
        });
        ctx
    }

    #[test]
    fn test_echo_path_with_body_cancels_with_json() {
        let mut ctx = ctx_for_path("/echo/hello");
        EchoProcessor
            .process_request_body(&mut ctx, "ping")
            .unwrap();

        let response = ctx.response_for(Phase::RequestBody);
        let Some(processing_response::Response::ImmediateResponse(immediate)) = response.response
        else {
            panic!("expected immediate response");
        };
        assert_eq!(immediate.status.unwrap().code, 200);
        let body: serde_json::Value =
            serde_json::from_slice(&immediate.body).unwrap();
        assert_eq!(body["path"], "/echo/hello");
        assert_eq!(body["body"], "ping");
    }

    #[test]
    fn test_other_paths_continue() {
        let mut ctx = ctx_for_path("/api/orders");
        EchoProcessor
            .process_request_body(&mut ctx, "ping")
            .unwrap();
        assert!(!ctx.is_cancelled());
    }
}
