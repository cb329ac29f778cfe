//! Marks each side of the exchange with a seen header

use std::collections::HashMap;

use crate::context::RequestContext;
use crate::error::Result;
use crate::processor::RequestProcessor;

pub struct TrivialProcessor;

impl RequestProcessor for TrivialProcessor {
    fn name(&self) -> &str {
        "trivial"
    }

    fn process_request_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        ctx.add_header("x-extproc-request-seen", "true")
    }

    fn process_response_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        ctx.add_header("x-extproc-response-seen", "true")
    }

    fn process_response_body(&self, ctx: &mut RequestContext, _body: &str) -> Result<()> {
        ctx.add_header("x-extproc-response-seen", "true")
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
    fn test_marks_request_side() {
        let mut ctx = RequestContext::new("x-request-id");
        TrivialProcessor
            .process_request_headers(&mut ctx, &HashMap::new())
            .unwrap();

        let response = ctx.response_for(Phase::RequestHeaders);
        let Some(processing_response::Response::RequestHeaders(headers)) = response.response
        else {
            panic!("expected request headers response");
        };
        let set = headers.response.unwrap().header_mutation.unwrap().set_headers;
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].header.as_ref().unwrap().key, "x-extproc-request-seen");
    }
}
