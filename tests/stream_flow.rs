//! Real gRPC stream flow tests
//!
//! These start an actual tonic server hosting the ext_proc engine, drive it
//! with a real bidirectional streaming client, and verify the phase
//! responses that come back.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::Server;

use seula::processors::{DedupProcessor, EchoProcessor, TrivialProcessor};
use seula::proto::envoy::config::core::v3::{HeaderMap, HeaderValue};
use seula::proto::envoy::service::ext_proc::v3::external_processor_client::ExternalProcessorClient;
use seula::proto::envoy::service::ext_proc::v3::external_processor_server::ExternalProcessorServer;
use seula::proto::envoy::service::ext_proc::v3::{
    processing_request, processing_response, HttpBody, HttpHeaders, ProcessingRequest,
};
use seula::{Config, ExtProcService, RequestProcessor};

async fn start_server(processor: Arc<dyn RequestProcessor>) -> SocketAddr {
    let service = ExtProcService::new(processor, &Config::default());

    // Find available port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    tokio::spawn(async move {
        Server::builder()
            .add_service(ExternalProcessorServer::new(service))
            .serve(addr)
            .await
            .ok();
    });

    // Wait for server to be ready
    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

async fn open_stream(
    addr: SocketAddr,
) -> (
    tokio::sync::mpsc::Sender<ProcessingRequest>,
    tonic::Streaming<seula::proto::envoy::service::ext_proc::v3::ProcessingResponse>,
) {
    let mut client = ExternalProcessorClient::connect(format!("http://{addr}"))
        .await
        .unwrap();
    let (tx, rx) = tokio::sync::mpsc::channel(8);
    let inbound = client
        .process(ReceiverStream::new(rx))
        .await
        .unwrap()
        .into_inner();
    (tx, inbound)
}

fn header(key: &str, value: &str) -> HeaderValue {
    HeaderValue {
        key: key.to_string(),
        value: value.to_string(),
        raw_value: Vec::new(),
    }
}

fn request_headers(headers: Vec<HeaderValue>, end_of_stream: bool) -> ProcessingRequest {
    ProcessingRequest {
        observability_mode: false,
        request: Some(processing_request::Request::RequestHeaders(HttpHeaders {
            headers: Some(HeaderMap { headers }),
            end_of_stream,
        })),
    }
}

fn request_body(body: &str, end_of_stream: bool) -> ProcessingRequest {
    ProcessingRequest {
        observability_mode: false,
        request: Some(processing_request::Request::RequestBody(HttpBody {
            body: body.as_bytes().to_vec(),
            end_of_stream,
        })),
    }
}

fn response_headers(headers: Vec<HeaderValue>, end_of_stream: bool) -> ProcessingRequest {
    ProcessingRequest {
        observability_mode: false,
        request: Some(processing_request::Request::ResponseHeaders(HttpHeaders {
            headers: Some(HeaderMap { headers }),
            end_of_stream,
        })),
    }
}

fn set_header_keys(mutation: &seula::proto::envoy::service::ext_proc::v3::HeaderMutation) -> Vec<String> {
    mutation
        .set_headers
        .iter()
        .map(|o| o.header.as_ref().unwrap().key.clone())
        .collect()
}

#[tokio::test]
async fn full_exchange_with_trivial_processor() {
    let addr = start_server(Arc::new(TrivialProcessor)).await;
    let (tx, mut inbound) = open_stream(addr).await;

    tx.send(request_headers(
        vec![
            header(":method", "GET"),
            header(":path", "/api/things"),
            header("x-request-id", "req-1"),
        ],
        false,
    ))
    .await
    .unwrap();

    let reply = inbound.message().await.unwrap().unwrap();
    let Some(processing_response::Response::RequestHeaders(headers)) = reply.response else {
        panic!("expected request headers response");
    };
    let mutation = headers.response.unwrap().header_mutation.unwrap();
    assert!(set_header_keys(&mutation).contains(&"x-extproc-request-seen".to_string()));

    tx.send(request_body("payload", true)).await.unwrap();
    let reply = inbound.message().await.unwrap().unwrap();
    assert!(matches!(
        reply.response,
        Some(processing_response::Response::RequestBody(_))
    ));

    tx.send(response_headers(vec![header(":status", "200")], true))
        .await
        .unwrap();
    let reply = inbound.message().await.unwrap().unwrap();
    let Some(processing_response::Response::ResponseHeaders(headers)) = reply.response else {
        panic!("expected response headers response");
    };
    let mutation = headers.response.unwrap().header_mutation.unwrap();
    assert!(set_header_keys(&mutation).contains(&"x-extproc-response-seen".to_string()));

    // exchange is complete, the server closes its side of the stream
    assert!(inbound.message().await.unwrap().is_none());
}

#[tokio::test]
async fn duration_chain_header_upserts_on_response_side() {
    let addr = start_server(Arc::new(TrivialProcessor)).await;
    let (tx, mut inbound) = open_stream(addr).await;

    tx.send(request_headers(vec![header(":path", "/")], false))
        .await
        .unwrap();
    inbound.message().await.unwrap().unwrap();

    // a previous ext_proc hop already contributed a timing entry
    tx.send(response_headers(
        vec![
            header(":status", "200"),
            header("x-extproc-duration-ns", "other=5"),
        ],
        true,
    ))
    .await
    .unwrap();

    let reply = inbound.message().await.unwrap().unwrap();
    let Some(processing_response::Response::ResponseHeaders(headers)) = reply.response else {
        panic!("expected response headers response");
    };
    let mutation = headers.response.unwrap().header_mutation.unwrap();
    let duration = mutation
        .set_headers
        .iter()
        .find(|o| o.header.as_ref().unwrap().key == "x-extproc-duration-ns")
        .expect("duration chain header present");
    let value = String::from_utf8(duration.header.as_ref().unwrap().raw_value.clone()).unwrap();
    assert!(value.starts_with("other=5,trivial="), "got {value}");
}

#[tokio::test]
async fn echo_path_gets_immediate_response() {
    let addr = start_server(Arc::new(EchoProcessor)).await;
    let (tx, mut inbound) = open_stream(addr).await;

    tx.send(request_headers(
        vec![header(":method", "GET"), header(":path", "/echo/hi")],
        true,
    ))
    .await
    .unwrap();

    let reply = inbound.message().await.unwrap().unwrap();
    let Some(processing_response::Response::ImmediateResponse(immediate)) = reply.response else {
        panic!("expected immediate response");
    };
    assert_eq!(immediate.status.unwrap().code, 200);
    let body: serde_json::Value = serde_json::from_slice(&immediate.body).unwrap();
    assert_eq!(body["path"], "/echo/hi");

    // terminal outcome ends the exchange
    assert!(inbound.message().await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_duplicate_gets_conflict_rejection() {
    let addr = start_server(Arc::new(DedupProcessor::new())).await;

    let digest = header("x-extproc-request-digest", "digest-abc");
    let (tx1, mut inbound1) = open_stream(addr).await;
    tx1.send(request_headers(
        vec![header("x-request-id", "req-1"), digest.clone()],
        false,
    ))
    .await
    .unwrap();
    let reply = inbound1.message().await.unwrap().unwrap();
    assert!(matches!(
        reply.response,
        Some(processing_response::Response::RequestHeaders(_))
    ));

    // same digest while the first request is still in flight
    let (tx2, mut inbound2) = open_stream(addr).await;
    tx2.send(request_headers(
        vec![header("x-request-id", "req-2"), digest.clone()],
        false,
    ))
    .await
    .unwrap();
    let reply = inbound2.message().await.unwrap().unwrap();
    let Some(processing_response::Response::ImmediateResponse(immediate)) = reply.response else {
        panic!("expected conflict rejection");
    };
    assert_eq!(immediate.status.unwrap().code, 409);
    let body: serde_json::Value = serde_json::from_slice(&immediate.body).unwrap();
    assert_eq!(body["requestId"], "req-1");

    // first exchange completes, releasing the slot for a retry
    tx1.send(response_headers(vec![header(":status", "200")], true))
        .await
        .unwrap();
    inbound1.message().await.unwrap().unwrap();

    let (tx3, mut inbound3) = open_stream(addr).await;
    tx3.send(request_headers(
        vec![header("x-request-id", "req-3"), digest],
        false,
    ))
    .await
    .unwrap();
    let reply = inbound3.message().await.unwrap().unwrap();
    assert!(matches!(
        reply.response,
        Some(processing_response::Response::RequestHeaders(_))
    ));
}

#[tokio::test]
async fn client_close_mid_exchange_is_quiet() {
    let addr = start_server(Arc::new(TrivialProcessor)).await;
    let (tx, mut inbound) = open_stream(addr).await;

    tx.send(request_headers(vec![header(":path", "/")], false))
        .await
        .unwrap();
    inbound.message().await.unwrap().unwrap();

    // client walks away mid-exchange
    drop(tx);
    assert!(inbound.message().await.unwrap().is_none());

    // the server is still healthy for new streams
    let (tx2, mut inbound2) = open_stream(addr).await;
    tx2.send(request_headers(vec![header(":path", "/")], false))
        .await
        .unwrap();
    inbound2.message().await.unwrap().unwrap();
}
