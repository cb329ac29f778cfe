//! Per-stream request context
//!
//! One `RequestContext` lives for the duration of a single ext_proc stream.
//! It accumulates parsed request/response metadata, pending header and body
//! mutation intents, timing data, and the terminal outcome if a processor
//! cancels the exchange. Phases on a stream arrive strictly in order, so no
//! field here needs locking; the context is dropped when the stream closes.
//!
//! Pending mutations are per-phase scratch: the dispatcher clears them at
//! every phase boundary via [`RequestContext::begin_phase`]. The terminal
//! outcome is the one thing that survives resets — once a request is
//! cancelled, every later phase response repeats the immediate response.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use percent_encoding::percent_decode_str;

use crate::error::{Result, SeulaError};
use crate::phase::{Phase, PHASE_COUNT};
use crate::proto::envoy::config::core::v3::{
    header_value_option::HeaderAppendAction, HeaderMap, HeaderValue, HeaderValueOption,
};
use crate::proto::envoy::r#type::v3::HttpStatus;
use crate::proto::envoy::service::ext_proc::v3::{
    body_mutation, processing_response, BodyMutation, BodyResponse, CommonResponse,
    HeaderMutation, HeadersResponse, ImmediateResponse, ProcessingResponse, TrailersResponse,
};
use crate::proto::envoy::service::ext_proc::v3::common_response::ResponseStatus;

/// Per-stream mutation buffer and exchange metadata
pub struct RequestContext {
    request_id_header: String,

    phase: Option<Phase>,
    started: Instant,
    phase_durations: [Duration; PHASE_COUNT],
    total_duration: Duration,

    scheme: String,
    authority: String,
    method: String,
    path: String,
    query: String,
    params: BTreeMap<String, Vec<String>>,
    status: u32,
    request_id: String,

    // Keys lowercased on insert; Envoy guarantees lowercase on the wire but
    // processors look headers up in arbitrary case.
    request_headers: BTreeMap<String, String>,
    response_headers: BTreeMap<String, String>,

    end_of_stream: bool,
    set_headers: Vec<HeaderValueOption>,
    remove_headers: Vec<String>,
    body_mutation: Option<BodyMutation>,
    replace: bool,

    cancelled: bool,
    immediate: Option<ImmediateResponse>,
}

impl RequestContext {
    pub fn new(request_id_header: impl Into<String>) -> Self {
        Self {
            request_id_header: request_id_header.into().to_ascii_lowercase(),
            phase: None,
            started: Instant::now(),
            phase_durations: [Duration::ZERO; PHASE_COUNT],
            total_duration: Duration::ZERO,
            scheme: String::new(),
            authority: String::new(),
            method: String::new(),
            path: String::new(),
            query: String::new(),
            params: BTreeMap::new(),
            status: 0,
            request_id: String::new(),
            request_headers: BTreeMap::new(),
            response_headers: BTreeMap::new(),
            end_of_stream: false,
            set_headers: Vec::new(),
            remove_headers: Vec::new(),
            body_mutation: None,
            replace: false,
            cancelled: false,
            immediate: None,
        }
    }

    /// Enter a phase, clearing per-phase scratch state
    ///
    /// The first phase skips the clear: construction already left the
    /// scratch fields empty. The terminal outcome is never cleared.
    pub fn begin_phase(&mut self, phase: Phase) {
        if self.phase.is_some() {
            self.set_headers.clear();
            self.remove_headers.clear();
            self.body_mutation = None;
            self.replace = false;
            self.end_of_stream = false;
        }
        self.phase = Some(phase);
    }

    /// Phase currently being processed, if any
    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Populate request-side metadata from the headers phase
    ///
    /// Pseudo-headers route into scheme/authority/method/path (path through
    /// query parsing), the configured request-id header is captured, and the
    /// rest lands in the request header map. Returns the plain map handed to
    /// the processor callback. An empty header list yields an empty map.
    pub fn initialize_request(&mut self, headers: &HeaderMap) -> HashMap<String, String> {
        for hv in &headers.headers {
            let key = hv.key.to_ascii_lowercase();
            let val = header_value(hv);
            if let Some(pseudo) = key.strip_prefix(':') {
                match pseudo {
                    "scheme" => self.scheme = val,
                    "authority" => self.authority = val,
                    "method" => self.method = val,
                    "path" => self.parse_path(&val),
                    _ => {}
                }
            } else if key == self.request_id_header {
                self.request_id = val;
            } else {
                self.request_headers.insert(key, val);
            }
        }
        self.request_headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Populate response-side metadata from the headers phase
    ///
    /// `:status` parses with a `0` fallback on absent or non-numeric values.
    pub fn initialize_response(&mut self, headers: Option<&HeaderMap>) -> HashMap<String, String> {
        if let Some(headers) = headers {
            for hv in &headers.headers {
                let key = hv.key.to_ascii_lowercase();
                let val = header_value(hv);
                if key == ":status" {
                    self.status = val.parse().unwrap_or(0);
                } else if !key.starts_with(':') {
                    self.response_headers.insert(key, val);
                }
            }
        }
        self.response_headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn parse_path(&mut self, raw: &str) {
        match raw.split_once('?') {
            Some((path, query)) => {
                self.path = path.to_string();
                self.query = percent_decode_str(query).decode_utf8_lossy().into_owned();
                let query = self.query.clone();
                self.parse_query_params(&query);
            }
            None => self.path = raw.to_string(),
        }
    }

    // A key without a value (no "=" or an empty one) is recorded with an
    // empty value list, matching what chained hops already rely on.
    fn parse_query_params(&mut self, decoded: &str) {
        if decoded.is_empty() {
            return;
        }
        for param in decoded.split('&') {
            let (key, value) = param.split_once('=').unwrap_or((param, ""));
            let values = self.params.entry(key.to_string()).or_default();
            if !value.is_empty() {
                values.push(value.to_string());
            }
        }
    }

    /// Record elapsed time for a phase slot and accumulate the total
    pub fn update_duration(&mut self, phase: Phase, elapsed: Duration) {
        self.phase_durations[phase.index()] = elapsed;
        self.total_duration += elapsed;
    }

    // Accessors

    pub fn request_headers(&self) -> &BTreeMap<String, String> {
        &self.request_headers
    }

    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn request_header_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.request_header(name).unwrap_or(default)
    }

    pub fn response_headers(&self) -> &BTreeMap<String, String> {
        &self.response_headers
    }

    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn response_header_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.response_header(name).unwrap_or(default)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> &str {
        &self.query
    }

    pub fn params(&self) -> &BTreeMap<String, Vec<String>> {
        &self.params
    }

    pub fn status(&self) -> u32 {
        self.status
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Total processing time accumulated across all phases so far
    pub fn duration(&self) -> Duration {
        self.total_duration
    }

    pub fn phase_duration(&self, phase: Phase) -> Duration {
        self.phase_durations[phase.index()]
    }

    /// True if the message for the current phase marked the end of its stream
    pub fn stream_complete(&self) -> bool {
        self.end_of_stream
    }

    pub(crate) fn set_end_of_stream(&mut self, end_of_stream: bool) {
        self.end_of_stream = end_of_stream;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// True once no further phase messages are expected on this stream
    pub fn is_processing_complete(&self) -> bool {
        self.cancelled
            || (self.end_of_stream && self.phase.map(Phase::is_response_side).unwrap_or(false))
    }

    // Header mutation API. Mutations accumulate in order within a phase; the
    // proxy applies them in order, so duplicate names ride along untouched.
    // An empty name or value is a no-op. Calls after cancellation are
    // rejected with `ContextFinished`.

    pub fn append_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.update_header(name, value, HeaderAppendAction::AppendIfExistsOrAdd)
    }

    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.update_header(name, value, HeaderAppendAction::AddIfAbsent)
    }

    pub fn overwrite_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.update_header(name, value, HeaderAppendAction::OverwriteIfExistsOrAdd)
    }

    pub fn remove_header(&mut self, name: &str) -> Result<()> {
        if self.cancelled {
            return Err(SeulaError::ContextFinished);
        }
        if !name.is_empty() {
            self.remove_headers.push(name.to_string());
        }
        Ok(())
    }

    pub fn append_headers(&mut self, headers: &HashMap<String, String>) -> Result<()> {
        for (name, value) in headers {
            self.append_header(name, value)?;
        }
        Ok(())
    }

    pub fn add_headers(&mut self, headers: &HashMap<String, String>) -> Result<()> {
        for (name, value) in headers {
            self.add_header(name, value)?;
        }
        Ok(())
    }

    pub fn overwrite_headers(&mut self, headers: &HashMap<String, String>) -> Result<()> {
        for (name, value) in headers {
            self.overwrite_header(name, value)?;
        }
        Ok(())
    }

    pub fn remove_header_names(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            self.remove_header(name)?;
        }
        Ok(())
    }

    fn update_header(&mut self, name: &str, value: &str, action: HeaderAppendAction) -> Result<()> {
        if self.cancelled {
            return Err(SeulaError::ContextFinished);
        }
        if !name.is_empty() && !value.is_empty() {
            self.push_header(name, value, action);
        }
        Ok(())
    }

    fn push_header(&mut self, name: &str, value: &str, action: HeaderAppendAction) {
        self.set_headers.push(HeaderValueOption {
            header: Some(HeaderValue {
                key: name.to_string(),
                value: String::new(),
                raw_value: value.as_bytes().to_vec(),
            }),
            append_action: action as i32,
            keep_empty_value: false,
        });
    }

    // Body mutation API, last write wins

    pub fn replace_body_chunk(&mut self, body: impl Into<Vec<u8>>) -> Result<()> {
        if self.cancelled {
            return Err(SeulaError::ContextFinished);
        }
        self.body_mutation = Some(BodyMutation {
            mutation: Some(body_mutation::Mutation::Body(body.into())),
        });
        Ok(())
    }

    pub fn clear_body_chunk(&mut self) -> Result<()> {
        if self.cancelled {
            return Err(SeulaError::ContextFinished);
        }
        self.body_mutation = Some(BodyMutation {
            mutation: Some(body_mutation::Mutation::ClearBody(true)),
        });
        Ok(())
    }

    /// Request continue-and-replace semantics for the current phase
    pub fn continue_and_replace(&mut self) {
        self.replace = true;
    }

    // Terminal outcome

    pub fn cancel_request(&mut self, status: u32) {
        self.cancel_request_full(status, None, "");
    }

    pub fn cancel_request_with_headers(&mut self, status: u32, headers: &HashMap<String, String>) {
        self.cancel_request_full(status, Some(headers), "");
    }

    pub fn cancel_request_with_body(&mut self, status: u32, body: &str) {
        self.cancel_request_full(status, None, body);
    }

    /// Short-circuit the exchange with an immediate response
    ///
    /// Optional headers merge in with append semantics before the response
    /// is snapshotted. Calling this again replaces the previous outcome;
    /// the last call wins. The immediate response only carries string
    /// bodies.
    pub fn cancel_request_full(
        &mut self,
        status: u32,
        headers: Option<&HashMap<String, String>>,
        body: &str,
    ) {
        self.cancelled = true;
        if let Some(headers) = headers {
            for (name, value) in headers {
                if !name.is_empty() && !value.is_empty() {
                    self.push_header(name, value, HeaderAppendAction::AppendIfExistsOrAdd);
                }
            }
        }
        self.immediate = Some(ImmediateResponse {
            status: Some(HttpStatus {
                code: status as i32,
            }),
            headers: Some(self.header_mutation()),
            body: body.as_bytes().to_vec(),
            grpc_status: None,
            details: String::new(),
        });
    }

    /// Build the wire response for a phase
    ///
    /// A set terminal outcome short-circuits every phase. Header and body
    /// phases carry the accumulated header mutation, the pending body
    /// mutation, and the continue-and-replace status; trailer phases carry
    /// the header mutation only.
    pub fn response_for(&self, phase: Phase) -> ProcessingResponse {
        if self.cancelled {
            if let Some(immediate) = &self.immediate {
                return ProcessingResponse {
                    response: Some(processing_response::Response::ImmediateResponse(
                        immediate.clone(),
                    )),
                };
            }
        }
        let response = match phase {
            Phase::RequestHeaders => {
                processing_response::Response::RequestHeaders(self.headers_response())
            }
            Phase::RequestBody => processing_response::Response::RequestBody(self.body_response()),
            Phase::RequestTrailers => {
                processing_response::Response::RequestTrailers(self.trailers_response())
            }
            Phase::ResponseHeaders => {
                processing_response::Response::ResponseHeaders(self.headers_response())
            }
            Phase::ResponseBody => {
                processing_response::Response::ResponseBody(self.body_response())
            }
            Phase::ResponseTrailers => {
                processing_response::Response::ResponseTrailers(self.trailers_response())
            }
        };
        ProcessingResponse {
            response: Some(response),
        }
    }

    fn headers_response(&self) -> HeadersResponse {
        HeadersResponse {
            response: Some(self.common_response()),
        }
    }

    fn body_response(&self) -> BodyResponse {
        BodyResponse {
            response: Some(self.common_response()),
        }
    }

    fn trailers_response(&self) -> TrailersResponse {
        TrailersResponse {
            header_mutation: Some(self.header_mutation()),
        }
    }

    fn common_response(&self) -> CommonResponse {
        let status = if self.replace {
            ResponseStatus::ContinueAndReplace
        } else {
            ResponseStatus::Continue
        };
        CommonResponse {
            status: status as i32,
            header_mutation: Some(self.header_mutation()),
            body_mutation: self.body_mutation.clone(),
            trailers: None,
            clear_route_cache: false,
        }
    }

    fn header_mutation(&self) -> HeaderMutation {
        HeaderMutation {
            set_headers: self.set_headers.clone(),
            remove_headers: self.remove_headers.clone(),
        }
    }
}

/// Prefer the raw byte encoding, falling back to the string field
fn header_value(hv: &HeaderValue) -> String {
    if hv.raw_value.is_empty() {
        hv.value.clone()
    } else {
        String::from_utf8_lossy(&hv.raw_value).into_owned()
    }
}

/// Plain case-normalized map from a proto header list
pub(crate) fn plain_map(headers: Option<&HeaderMap>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Some(headers) = headers {
        for hv in &headers.headers {
            map.insert(hv.key.to_ascii_lowercase(), header_value(hv));
        }
    }
    map
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    fn header(key: &str, value: &str) -> HeaderValue {
        HeaderValue {
            key: key.to_string(),
            value: value.to_string(),
            raw_value: Vec::new(),
        }
    }

    fn raw_header(key: &str, value: &[u8]) -> HeaderValue {
        HeaderValue {
            key: key.to_string(),
            value: String::new(),
            raw_value: value.to_vec(),
        }
    }

    fn request_headers() -> HeaderMap {
        HeaderMap {
            headers: vec![
                header(":scheme", "https"),
                header(":authority", "svc.internal"),
                header(":method", "GET"),
                header(":path", "/foo?x=1&x=2&y="),
                header("x-request-id", "req-123"),
                header("Content-Type", "application/json"),
            ],
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new("x-request-id")
    }

    #[test]
    fn test_initialize_request_routes_pseudo_headers() {
        let mut ctx = ctx();
        let map = ctx.initialize_request(&request_headers());

        assert_eq!(ctx.scheme(), "https");
        assert_eq!(ctx.authority(), "svc.internal");
        assert_eq!(ctx.method(), "GET");
        assert_eq!(ctx.path(), "/foo");
        assert_eq!(ctx.request_id(), "req-123");
        assert_eq!(map.get("content-type").unwrap(), "application/json");
        assert!(!map.contains_key(":method"));
        assert!(!map.contains_key("x-request-id"));
    }

    #[test]
    fn test_path_parsing_multi_value_and_empty_params() {
        let mut ctx = ctx();
        ctx.initialize_request(&request_headers());

        assert_eq!(ctx.query_string(), "x=1&x=2&y=");
        assert_eq!(ctx.params().get("x").unwrap(), &vec!["1", "2"]);
        assert!(ctx.params().get("y").unwrap().is_empty());
    }

    #[test]
    fn test_path_without_query() {
        let mut ctx = ctx();
        ctx.initialize_request(&HeaderMap {
            headers: vec![header(":path", "/bare")],
        });
        assert_eq!(ctx.path(), "/bare");
        assert_eq!(ctx.query_string(), "");
        assert!(ctx.params().is_empty());
    }

    #[test]
    fn test_percent_decoded_query() {
        let mut ctx = ctx();
        ctx.initialize_request(&HeaderMap {
            headers: vec![header(":path", "/search?q=hello%20world")],
        });
        assert_eq!(ctx.params().get("q").unwrap(), &vec!["hello world"]);
    }

    #[test]
    fn test_raw_value_preferred_over_value() {
        let mut ctx = ctx();
        ctx.initialize_request(&HeaderMap {
            headers: vec![raw_header("x-blob", b"bytes-win")],
        });
        assert_eq!(ctx.request_header("x-blob").unwrap(), "bytes-win");
    }

    #[test]
    fn test_initialize_response_status_parsing() {
        let mut ctx = ctx();
        ctx.initialize_response(Some(&HeaderMap {
            headers: vec![header(":status", "200"), header("Server", "envoy")],
        }));
        assert_eq!(ctx.status(), 200);
        assert_eq!(ctx.response_header("server").unwrap(), "envoy");
    }

    #[test]
    fn test_non_numeric_status_defaults_to_zero() {
        let mut ctx = ctx();
        ctx.initialize_response(Some(&HeaderMap {
            headers: vec![header(":status", "nan")],
        }));
        assert_eq!(ctx.status(), 0);

        let mut ctx = RequestContext::new("x-request-id");
        ctx.initialize_response(None);
        assert_eq!(ctx.status(), 0);
    }

    #[test]
    fn test_update_duration_accumulates_total() {
        let mut ctx = ctx();
        ctx.update_duration(Phase::RequestHeaders, Duration::from_nanos(100));
        ctx.update_duration(Phase::RequestBody, Duration::from_nanos(50));
        ctx.update_duration(Phase::RequestBody, Duration::from_nanos(75));

        assert_eq!(
            ctx.phase_duration(Phase::RequestBody),
            Duration::from_nanos(75)
        );
        assert_eq!(ctx.duration(), Duration::from_nanos(225));
    }

    #[test]
    fn test_header_mutations_accumulate_in_order() {
        let mut ctx = ctx();
        ctx.begin_phase(Phase::RequestHeaders);
        ctx.append_header("x-a", "1").unwrap();
        ctx.add_header("x-b", "2").unwrap();
        ctx.overwrite_header("x-a", "3").unwrap();
        ctx.remove_header("x-c").unwrap();

        let response = ctx.response_for(Phase::RequestHeaders);
        let Some(processing_response::Response::RequestHeaders(headers)) = response.response
        else {
            panic!("expected request headers response");
        };
        let common = headers.response.unwrap();
        assert_eq!(common.status, ResponseStatus::Continue as i32);
        let mutation = common.header_mutation.unwrap();
        assert_eq!(mutation.set_headers.len(), 3);
        assert_eq!(mutation.remove_headers, vec!["x-c".to_string()]);

        let first = mutation.set_headers[0].header.as_ref().unwrap();
        assert_eq!(first.key, "x-a");
        assert_eq!(first.raw_value, b"1");
        assert_eq!(
            mutation.set_headers[0].append_action,
            HeaderAppendAction::AppendIfExistsOrAdd as i32
        );
        assert_eq!(
            mutation.set_headers[2].append_action,
            HeaderAppendAction::OverwriteIfExistsOrAdd as i32
        );
    }

    #[test]
    fn test_empty_name_or_value_is_noop() {
        let mut ctx = ctx();
        ctx.append_header("", "v").unwrap();
        ctx.append_header("n", "").unwrap();
        ctx.remove_header("").unwrap();
        assert!(ctx.set_headers.is_empty());
        assert!(ctx.remove_headers.is_empty());
    }

    #[test]
    fn test_phase_reset_clears_pending_mutations() {
        let mut ctx = ctx();
        ctx.begin_phase(Phase::RequestHeaders);
        ctx.append_header("x-a", "1").unwrap();
        ctx.replace_body_chunk("data").unwrap();
        ctx.continue_and_replace();

        ctx.begin_phase(Phase::RequestBody);
        let response = ctx.response_for(Phase::RequestBody);
        let Some(processing_response::Response::RequestBody(body)) = response.response else {
            panic!("expected request body response");
        };
        let common = body.response.unwrap();
        assert_eq!(common.status, ResponseStatus::Continue as i32);
        assert!(common.header_mutation.unwrap().set_headers.is_empty());
        assert!(common.body_mutation.is_none());
    }

    #[test]
    fn test_first_phase_keeps_initial_state() {
        let mut ctx = ctx();
        ctx.append_header("x-early", "1").unwrap();
        ctx.begin_phase(Phase::RequestHeaders);
        assert_eq!(ctx.set_headers.len(), 1);
    }

    #[test]
    fn test_body_mutation_last_write_wins() {
        let mut ctx = ctx();
        ctx.replace_body_chunk("x").unwrap();
        ctx.clear_body_chunk().unwrap();

        let response = ctx.response_for(Phase::RequestBody);
        let Some(processing_response::Response::RequestBody(body)) = response.response else {
            panic!("expected request body response");
        };
        let mutation = body.response.unwrap().body_mutation.unwrap();
        assert_eq!(
            mutation.mutation,
            Some(body_mutation::Mutation::ClearBody(true))
        );
    }

    #[test]
    fn test_continue_and_replace_status() {
        let mut ctx = ctx();
        ctx.continue_and_replace();
        let response = ctx.response_for(Phase::ResponseHeaders);
        let Some(processing_response::Response::ResponseHeaders(headers)) = response.response
        else {
            panic!("expected response headers response");
        };
        assert_eq!(
            headers.response.unwrap().status,
            ResponseStatus::ContinueAndReplace as i32
        );
    }

    #[test]
    fn test_trailer_response_carries_header_mutation_only() {
        let mut ctx = ctx();
        ctx.append_header("x-t", "1").unwrap();
        let response = ctx.response_for(Phase::ResponseTrailers);
        let Some(processing_response::Response::ResponseTrailers(trailers)) = response.response
        else {
            panic!("expected response trailers response");
        };
        assert_eq!(trailers.header_mutation.unwrap().set_headers.len(), 1);
    }

    #[test]
    fn test_cancel_short_circuits_every_phase() {
        let mut ctx = ctx();
        ctx.cancel_request_with_body(409, "duplicate");

        for phase in [
            Phase::RequestHeaders,
            Phase::ResponseBody,
            Phase::ResponseTrailers,
        ] {
            let response = ctx.response_for(phase);
            let Some(processing_response::Response::ImmediateResponse(immediate)) =
                response.response
            else {
                panic!("expected immediate response for {phase}");
            };
            assert_eq!(immediate.status.unwrap().code, 409);
            assert_eq!(immediate.body, b"duplicate");
        }
    }

    #[test]
    fn test_cancel_merges_headers_with_append_semantics() {
        let mut ctx = ctx();
        let mut headers = HashMap::new();
        headers.insert("x-reason".to_string(), "conflict".to_string());
        ctx.cancel_request_with_headers(409, &headers);

        let response = ctx.response_for(Phase::RequestHeaders);
        let Some(processing_response::Response::ImmediateResponse(immediate)) = response.response
        else {
            panic!("expected immediate response");
        };
        let set = immediate.headers.unwrap().set_headers;
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].header.as_ref().unwrap().key, "x-reason");
        assert_eq!(
            set[0].append_action,
            HeaderAppendAction::AppendIfExistsOrAdd as i32
        );
    }

    #[test]
    fn test_repeated_cancel_last_call_wins() {
        let mut ctx = ctx();
        ctx.cancel_request(403);
        ctx.cancel_request_with_body(503, "later");

        let response = ctx.response_for(Phase::RequestBody);
        let Some(processing_response::Response::ImmediateResponse(immediate)) = response.response
        else {
            panic!("expected immediate response");
        };
        assert_eq!(immediate.status.unwrap().code, 503);
        assert_eq!(immediate.body, b"later");
    }

    #[test]
    fn test_mutations_rejected_after_cancel() {
        let mut ctx = ctx();
        ctx.cancel_request(400);

        assert!(matches!(
            ctx.append_header("x-late", "1"),
            Err(SeulaError::ContextFinished)
        ));
        assert!(matches!(
            ctx.remove_header("x-late"),
            Err(SeulaError::ContextFinished)
        ));
        assert!(matches!(
            ctx.replace_body_chunk("late"),
            Err(SeulaError::ContextFinished)
        ));
        assert!(matches!(
            ctx.clear_body_chunk(),
            Err(SeulaError::ContextFinished)
        ));
    }

    #[test]
    fn test_cancel_survives_phase_reset() {
        let mut ctx = ctx();
        ctx.begin_phase(Phase::RequestHeaders);
        ctx.cancel_request(409);
        ctx.begin_phase(Phase::RequestBody);

        assert!(ctx.is_cancelled());
        let response = ctx.response_for(Phase::RequestBody);
        assert!(matches!(
            response.response,
            Some(processing_response::Response::ImmediateResponse(_))
        ));
    }

    #[test]
    fn test_processing_complete_tracking() {
        let mut ctx = ctx();
        assert!(!ctx.is_processing_complete());

        ctx.begin_phase(Phase::RequestHeaders);
        ctx.set_end_of_stream(true);
        assert!(!ctx.is_processing_complete());

        ctx.begin_phase(Phase::ResponseBody);
        ctx.set_end_of_stream(true);
        assert!(ctx.is_processing_complete());
    }

    #[test]
    fn test_plain_map_lowercases_keys() {
        let map = plain_map(Some(&HeaderMap {
            headers: vec![header("X-Upper", "v")],
        }));
        assert_eq!(map.get("x-upper").unwrap(), "v");
        assert!(plain_map(None).is_empty());
    }
}
