//! Phase dispatcher
//!
//! `ExtProcService` implements the generated `ExternalProcessor` service.
//! Each open stream gets its own [`RequestContext`] and a task draining the
//! inbound message stream; phases within a stream are strictly sequential,
//! concurrency only exists across streams.
//!
//! Error classification: a client cancellation completes the stream quietly;
//! a processor error or panic terminates the stream with an internal status;
//! a message without a recognizable phase oneof is fatal for the stream. A
//! processor-initiated `cancel_request` is none of these -- it is a normal
//! immediate response.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tokio_stream::Stream;
use tonic::{Code, Request, Response, Status, Streaming};
use tracing::{debug, error, info};

use crate::config::{Config, ProcessingOptions};
use crate::context::{plain_map, RequestContext};
use crate::error::SeulaError;
use crate::phase::Phase;
use crate::processor::RequestProcessor;
use crate::proto::envoy::config::core::v3::HeaderMap;
use crate::proto::envoy::service::ext_proc::v3::external_processor_server::ExternalProcessor;
use crate::proto::envoy::service::ext_proc::v3::{
    processing_request, ProcessingRequest, ProcessingResponse,
};

/// The ext_proc engine: routes phase messages to one processor
#[derive(Clone)]
pub struct ExtProcService {
    processor: Arc<dyn RequestProcessor>,
    name: String,
    options: ProcessingOptions,
    request_id_header: String,
}

impl ExtProcService {
    /// Wire a processor into the engine, reading its options once
    pub fn new(processor: Arc<dyn RequestProcessor>, config: &Config) -> Self {
        let name = processor.name().to_string();
        let options = processor.options();
        debug!(processor = %name, ?options, "setting up ext_proc service");
        Self {
            processor,
            name,
            options,
            request_id_header: config.request_id_header.clone(),
        }
    }

    /// Handle one phase message, producing the response to emit
    pub(crate) fn process_message(
        &self,
        ctx: &mut RequestContext,
        message: ProcessingRequest,
    ) -> Result<ProcessingResponse, Status> {
        let request = message.request.ok_or_else(|| {
            error!(processor = %self.name, "stream message carried no phase");
            Status::from(SeulaError::InvalidPhase)
        })?;
        let phase = Phase::from_request(&request);
        let phase_started = Instant::now();

        debug!(processor = %self.name, %phase, "processing phase");
        if self.options.log_phases {
            info!(processor = %self.name, %phase, "processing phase");
        }

        ctx.begin_phase(phase);
        if ctx.is_cancelled() {
            // terminal outcome already decided, just acknowledge the phase
            return Ok(ctx.response_for(phase));
        }

        let callback = AssertUnwindSafe(|| self.route_phase(ctx, &request));
        match catch_unwind(callback) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(processor = %self.name, %phase, error = %err, "processor failed");
                return Err(Status::from(SeulaError::Processor {
                    processor: self.name.clone(),
                    message: err.to_string(),
                }));
            }
            Err(panic) => {
                let message = panic_message(panic);
                error!(processor = %self.name, %phase, message, "processor panicked");
                return Err(Status::from(SeulaError::Processor {
                    processor: self.name.clone(),
                    message,
                }));
            }
        }

        ctx.update_duration(phase, phase_started.elapsed());
        self.apply_duration_header(ctx, phase);
        Ok(ctx.response_for(phase))
    }

    fn route_phase(
        &self,
        ctx: &mut RequestContext,
        request: &processing_request::Request,
    ) -> crate::error::Result<()> {
        use processing_request::Request;
        match request {
            Request::RequestHeaders(h) => {
                let empty = HeaderMap::default();
                let headers = ctx.initialize_request(h.headers.as_ref().unwrap_or(&empty));
                ctx.set_end_of_stream(h.end_of_stream);
                if self.options.log_stream {
                    debug!(processor = %self.name, ?headers, "request headers");
                }
                self.processor.process_request_headers(ctx, &headers)
            }
            Request::RequestBody(b) => {
                let body = String::from_utf8_lossy(&b.body);
                ctx.set_end_of_stream(b.end_of_stream);
                if self.options.log_stream {
                    debug!(processor = %self.name, body = %body, "request body");
                }
                self.processor.process_request_body(ctx, &body)
            }
            Request::RequestTrailers(t) => {
                let trailers = plain_map(t.trailers.as_ref());
                self.processor.process_request_trailers(ctx, &trailers)
            }
            Request::ResponseHeaders(h) => {
                let headers = ctx.initialize_response(h.headers.as_ref());
                ctx.set_end_of_stream(h.end_of_stream);
                if self.options.log_stream {
                    debug!(processor = %self.name, ?headers, "response headers");
                }
                self.processor.process_response_headers(ctx, &headers)
            }
            Request::ResponseBody(b) => {
                let body = String::from_utf8_lossy(&b.body);
                ctx.set_end_of_stream(b.end_of_stream);
                if self.options.log_stream {
                    debug!(processor = %self.name, body = %body, "response body");
                }
                self.processor.process_response_body(ctx, &body)
            }
            Request::ResponseTrailers(t) => {
                let trailers = plain_map(t.trailers.as_ref());
                self.processor.process_response_trailers(ctx, &trailers)
            }
        }
    }

    /// Upsert this hop's entry in the duration-chain header, if configured
    /// for the side the phase runs on
    fn apply_duration_header(&self, ctx: &mut RequestContext, phase: Phase) {
        if ctx.is_cancelled() {
            return;
        }
        let header = if phase.is_request_side() {
            self.options.upstream_duration_header.as_deref()
        } else {
            self.options.downstream_duration_header.as_deref()
        };
        let Some(header) = header else {
            return;
        };
        let existing = if phase.is_request_side() {
            ctx.request_header_or(header, "").to_string()
        } else {
            ctx.response_header_or(header, "").to_string()
        };
        let nanos = ctx.duration().as_nanos();
        let value = duration_header_value(&existing, &self.name, nanos);
        // cancellation was checked above, the overwrite cannot be rejected
        let _ = ctx.overwrite_header(header, &value);
    }
}

/// Upsert one processor's timing entry into a duration-chain value
///
/// Each chained ext_proc hop contributes exactly one `name=nanos` segment;
/// an existing segment for the same name is replaced in place, otherwise
/// the new segment is appended.
pub(crate) fn duration_header_value(existing: &str, name: &str, nanos: u128) -> String {
    let segment = format!("{name}={nanos}");
    if existing.is_empty() {
        return segment;
    }
    let mut sections: Vec<&str> = existing.split(',').collect();
    for section in sections.iter_mut() {
        if section.starts_with(name) {
            *section = &segment;
            return sections.join(",");
        }
    }
    format!("{existing},{segment}")
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "processor panicked".to_string()
    }
}

#[tonic::async_trait]
impl ExternalProcessor for ExtProcService {
    type ProcessStream =
        Pin<Box<dyn Stream<Item = Result<ProcessingResponse, Status>> + Send + 'static>>;

    async fn process(
        &self,
        request: Request<Streaming<ProcessingRequest>>,
    ) -> Result<Response<Self::ProcessStream>, Status> {
        let mut inbound = request.into_inner();
        let service = self.clone();

        let output = async_stream::try_stream! {
            let mut ctx = RequestContext::new(&service.request_id_header);
            loop {
                match inbound.message().await {
                    Ok(Some(message)) => {
                        let response = service.process_message(&mut ctx, message)?;
                        let complete = ctx.is_processing_complete();
                        yield response;
                        if complete {
                            debug!(processor = %service.name, "exchange complete");
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!(processor = %service.name, phase = ?ctx.phase(), "stream closed by client");
                        break;
                    }
                    Err(status) if status.code() == Code::Cancelled => {
                        // client went away, not an error
                        debug!(processor = %service.name, phase = ?ctx.phase(), "stream cancelled");
                        break;
                    }
                    Err(status) => {
                        error!(processor = %service.name, phase = ?ctx.phase(), error = %status, "stream error");
                        Err(status)?;
                    }
                }
            }
        };

        Ok(Response::new(Box::pin(output)))
    }
}
