//! Streams a SHA-256 digest of `method:path:body` across phases
//!
//! Hash state is keyed by request id and shared across streams, so it sits
//! behind a mutex. Entries are released when the response completes; a
//! stream that dies mid-exchange leaks its entry until process restart.

use std::collections::HashMap;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::context::RequestContext;
use crate::error::Result;
use crate::processor::RequestProcessor;

pub const REQUEST_DIGEST_HEADER: &str = "x-extproc-request-digest";
pub const RESPONSE_DIGEST_HEADER: &str = "x-extproc-response-digest";

pub struct DigestProcessor {
    hashers: Mutex<HashMap<String, Sha256>>,
    digests: Mutex<HashMap<String, String>>,
}

impl DigestProcessor {
    pub fn new() -> Self {
        Self {
            hashers: Mutex::new(HashMap::new()),
            digests: Mutex::new(HashMap::new()),
        }
    }

    fn finalize(hasher: Sha256) -> String {
        hex::encode(hasher.finalize())
    }
}

impl Default for DigestProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestProcessor for DigestProcessor {
    fn name(&self) -> &str {
        "digest"
    }

    fn process_request_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}:", ctx.method(), ctx.path()));
        if ctx.stream_complete() {
            let digest = Self::finalize(hasher);
            ctx.add_header(REQUEST_DIGEST_HEADER, &digest)?;
            self.digests
                .lock()
                .insert(ctx.request_id().to_string(), digest);
        } else {
            self.hashers
                .lock()
                .insert(ctx.request_id().to_string(), hasher);
        }
        Ok(())
    }

    fn process_request_body(&self, ctx: &mut RequestContext, body: &str) -> Result<()> {
        let mut hashers = self.hashers.lock();
        let hasher = hashers.entry(ctx.request_id().to_string()).or_default();
        hasher.update(body.as_bytes());
        if ctx.stream_complete() {
            let digest = Self::finalize(hashers.remove(ctx.request_id()).unwrap_or_default());
            drop(hashers);
            ctx.add_header(REQUEST_DIGEST_HEADER, &digest)?;
            self.digests
                .lock()
                .insert(ctx.request_id().to_string(), digest);
        }
        Ok(())
    }

    fn process_response_headers(
        &self,
        ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        if ctx.stream_complete() {
            let digest = self
                .digests
                .lock()
                .remove(ctx.request_id())
                .unwrap_or_default();
            self.hashers.lock().remove(ctx.request_id());
            ctx.add_header(REQUEST_DIGEST_HEADER, &digest)?;
            ctx.add_header(RESPONSE_DIGEST_HEADER, &digest)?;
        }
        Ok(())
    }

    fn process_response_body(&self, ctx: &mut RequestContext, body: &str) -> Result<()> {
        if ctx.stream_complete() {
            let request_digest = self
                .digests
                .lock()
                .remove(ctx.request_id())
                .unwrap_or_default();
            let mut hasher = self
                .hashers
                .lock()
                .remove(ctx.request_id())
                .unwrap_or_default();
            hasher.update(body.as_bytes());
            ctx.add_header(REQUEST_DIGEST_HEADER, &request_digest)?;
            ctx.add_header(RESPONSE_DIGEST_HEADER, &Self::finalize(hasher))?;
        } else {
            let mut hashers = self.hashers.lock();
            hashers
                .entry(ctx.request_id().to_string())
                .or_default()
                .update(body.as_bytes());
        }
        Ok(())
    }
}
