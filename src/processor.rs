//! Processor contract
//!
//! A processor implements six synchronous phase callbacks plus identity and
//! lifecycle hooks. One instance serves every concurrent stream, so any
//! cross-stream state a processor keeps must be synchronized (the builtin
//! dedup processor guards its in-flight map with a `parking_lot` mutex).

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ProcessingOptions;
use crate::context::RequestContext;
use crate::error::Result;

/// Handle for reporting processor health to the serving layer
///
/// `failed` is terminal: once reported, later `serving` calls are ignored
/// and the service stays NOT_SERVING until restart.
pub trait HealthSignal: Send + Sync + 'static {
    fn serving(&self);
    fn not_serving(&self);
    fn failed(&self);
}

/// Per-phase callbacks for one HTTP exchange
///
/// Callbacks receive the stream-local [`RequestContext`] plus the decoded
/// payload for the phase. Returning an error (or panicking) terminates the
/// stream with an internal gRPC status; business rejections go through
/// [`RequestContext::cancel_request`] instead.
pub trait RequestProcessor: Send + Sync + 'static {
    /// Stable name, used as the key in duration-chain headers
    fn name(&self) -> &str;

    /// Behavior toggles, read once when the processor is wired in
    fn options(&self) -> ProcessingOptions {
        ProcessingOptions::default()
    }

    /// Receive a health handle; processors that track their own readiness
    /// may hold on to it, everyone else ignores it
    fn bind_health_signal(&self, _signal: Arc<dyn HealthSignal>) {}

    /// Called once after the server drains, before process exit
    fn shutdown(&self) {}

    fn process_request_headers(
        &self,
        _ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        Ok(())
    }

    fn process_request_body(&self, _ctx: &mut RequestContext, _body: &str) -> Result<()> {
        Ok(())
    }

    fn process_request_trailers(
        &self,
        _ctx: &mut RequestContext,
        _trailers: &HashMap<String, String>,
    ) -> Result<()> {
        Ok(())
    }

    fn process_response_headers(
        &self,
        _ctx: &mut RequestContext,
        _headers: &HashMap<String, String>,
    ) -> Result<()> {
        Ok(())
    }

    fn process_response_body(&self, _ctx: &mut RequestContext, _body: &str) -> Result<()> {
        Ok(())
    }

    fn process_response_trailers(
        &self,
        _ctx: &mut RequestContext,
        _trailers: &HashMap<String, String>,
    ) -> Result<()> {
        Ok(())
    }
}
