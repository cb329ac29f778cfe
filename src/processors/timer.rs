//! Annotates the exchange with start/finish/duration headers

use std::collections::HashMap;

use chrono::{TimeDelta, Utc};

use crate::context::RequestContext;
use crate::error::Result;
use crate::processor::RequestProcessor;

pub struct TimerProcessor;

impl TimerProcessor {
    /// Wall-clock time the context was created, reconstructed from the
    /// monotonic start instant
    fn started_at(ctx: &RequestContext) -> chrono::DateTime<Utc> {
        let elapsed =
            TimeDelta::from_std(ctx.started().elapsed()).unwrap_or(TimeDelta::zero());
        Utc::now() - elapsed
    }

    fn process_complete(ctx: &mut RequestContext) -> Result<()> {
        let started = Self::started_at(ctx);
        let finished = Utc::now();
        let duration_ns = ctx.started().elapsed().as_nanos();
        ctx.add_header("x-extproc-started", &started.to_rfc3339())?;
        ctx.add_header("x-extproc-finished", &finished.to_rfc3339())?;
        ctx.add_header("x-extproc-upstream-duration-ns", &duration_ns.to_string())
    }
}

impl RequestProcessor for TimerProcessor {
    fn name(&self) -> &str {
        "timer"
    }

    fn process_request_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        let started = Self::started_at(ctx);
        ctx.add_header("x-extproc-started", &started.to_rfc3339())
    }

    fn process_response_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        if ctx.stream_complete() {
            Self::process_complete(ctx)?;
        }
        Ok(())
    }

    fn process_response_body(&self, ctx: &mut RequestContext, _body: &str) -> Result<()> {
        if ctx.stream_complete() {
            Self::process_complete(ctx)?;
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
    use crate::proto::envoy::service::ext_proc::v3::processing_response;

    #[test]
    fn test_completion_adds_timing_headers() {
        let mut ctx = RequestContext::new("x-request-id");
        ctx.begin_phase(Phase::ResponseBody);
        ctx.set_end_of_stream(true);
        TimerProcessor.process_response_body(&mut ctx, "").unwrap();

        let response = ctx.response_for(Phase::ResponseBody);
        let Some(processing_response::Response::ResponseBody(body)) = response.response else {
            panic!("expected response body response");
        };
        let set = body.response.unwrap().header_mutation.unwrap().set_headers;
        let keys: Vec<&str> = set
            .iter()
            .map(|o| o.header.as_ref().unwrap().key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec![
                "x-extproc-started",
                "x-extproc-finished",
                "x-extproc-upstream-duration-ns"
            ]
        );
    }

    #[test]
    fn test_mid_stream_response_body_untouched() {
        let mut ctx = RequestContext::new("x-request-id");
        ctx.begin_phase(Phase::ResponseBody);
        TimerProcessor.process_response_body(&mut ctx, "chunk").unwrap();

        let response = ctx.response_for(Phase::ResponseBody);
        let Some(processing_response::Response::ResponseBody(body)) = response.response else {
            panic!("expected response body response");
        };
        assert!(body.response.unwrap().header_mutation.unwrap().set_headers.is_empty());
    }
}
