//! Lifecycle host
//!
//! `ExtProcServer` binds the dispatcher to a tonic transport, wires the gRPC
//! health service, and orchestrates graceful shutdown: signal, pre-stop
//! hooks, bounded drain of in-flight streams, post-stop hooks. A processor's
//! `shutdown` runs as a post-stop hook so streams drain before it releases
//! resources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tonic::transport::Server;
use tonic_health::ServingStatus;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Result, SeulaError};
use crate::processor::{HealthSignal, RequestProcessor};
use crate::proto::envoy::service::ext_proc::v3::external_processor_server::{
    ExternalProcessorServer, SERVICE_NAME,
};
use crate::service::ExtProcService;

type StopHook = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopServing {
    No,
    /// Flip to NOT_SERVING after the other pre-stop hooks
    Last,
    /// Flip to NOT_SERVING before any other pre-stop hook
    First,
}

/// Builder and runner for the ext_proc server process
pub struct ExtProcServer {
    config: Config,
    processor: Option<Arc<dyn RequestProcessor>>,
    pre_stop_hooks: Vec<StopHook>,
    post_stop_hooks: Vec<StopHook>,
    stop_serving: StopServing,
}

impl ExtProcServer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            processor: None,
            pre_stop_hooks: Vec::new(),
            post_stop_hooks: Vec::new(),
            stop_serving: StopServing::No,
        }
    }

    /// Attach the processor serving this engine
    ///
    /// The processor's `shutdown` is registered as a post-stop hook: it runs
    /// after in-flight streams drain, which is when flush-and-close of any
    /// downstream dependency is actually safe.
    pub fn processor(mut self, processor: Arc<dyn RequestProcessor>) -> Self {
        let for_shutdown = Arc::clone(&processor);
        self.post_stop_hooks.push(Box::new(move || for_shutdown.shutdown()));
        self.processor = Some(processor);
        self
    }

    /// Run a hook before transport shutdown begins; hooks delay shutdown,
    /// keep them fast
    pub fn add_pre_stop_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.pre_stop_hooks.push(Box::new(hook));
        self
    }

    /// Run a hook after the transport has stopped and streams have drained
    pub fn add_post_stop_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.post_stop_hooks.push(Box::new(hook));
        self
    }

    /// Report NOT_SERVING during shutdown, after the other pre-stop hooks
    pub fn stop_serving_on_shutdown(mut self) -> Self {
        self.stop_serving = StopServing::Last;
        self
    }

    /// Report NOT_SERVING during shutdown, before any other pre-stop hook
    pub fn stop_serving_on_shutdown_first(mut self) -> Self {
        self.stop_serving = StopServing::First;
        self
    }

    /// Serve until a termination signal, then drain and run hooks
    pub async fn serve(mut self) -> Result<()> {
        let addr: std::net::SocketAddr = self
            .config
            .listen
            .parse()
            .map_err(|e| SeulaError::Config(format!("invalid listen address: {e}")))?;
        let processor = self
            .processor
            .take()
            .ok_or_else(|| SeulaError::Config("no processor attached to server".to_string()))?;

        let (mut reporter, health_service) = tonic_health::server::health_reporter();
        reporter
            .set_service_status(SERVICE_NAME, ServingStatus::Serving)
            .await;

        // Processor health verbs are synchronous; forward them through a
        // channel to a task that owns the async reporter.
        let (health_tx, mut health_rx) = mpsc::unbounded_channel::<HealthEvent>();
        tokio::spawn(async move {
            let mut failed = false;
            while let Some(event) = health_rx.recv().await {
                let status = match event {
                    HealthEvent::Serving if failed => continue,
                    HealthEvent::Serving => ServingStatus::Serving,
                    HealthEvent::NotServing => ServingStatus::NotServing,
                    HealthEvent::Failed => {
                        failed = true;
                        ServingStatus::NotServing
                    }
                };
                reporter.set_service_status(SERVICE_NAME, status).await;
            }
        });
        processor.bind_health_signal(Arc::new(HealthForwarder {
            tx: health_tx.clone(),
            failed: AtomicBool::new(false),
        }));

        match self.stop_serving {
            StopServing::No => {}
            StopServing::Last => {
                let tx = health_tx.clone();
                self.pre_stop_hooks.push(Box::new(move || {
                    let _ = tx.send(HealthEvent::NotServing);
                }));
            }
            StopServing::First => {
                let tx = health_tx.clone();
                self.pre_stop_hooks.insert(
                    0,
                    Box::new(move || {
                        let _ = tx.send(HealthEvent::NotServing);
                    }),
                );
            }
        }

        let service = ExtProcService::new(Arc::clone(&processor), &self.config);
        let mut ext_proc = ExternalProcessorServer::new(service);
        if let Some(limit) = self.config.max_message_size {
            ext_proc = ext_proc.max_decoding_message_size(limit);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let mut server = tokio::spawn(
            Server::builder()
                .add_service(health_service)
                .add_service(ext_proc)
                .serve_with_shutdown(addr, async {
                    let _ = shutdown_rx.await;
                }),
        );

        info!(%addr, processor = processor.name(), "ext_proc server started");
        shutdown_signal().await;
        info!("shutdown signal received");

        debug!(hooks = self.pre_stop_hooks.len(), "running pre-stop hooks");
        for hook in self.pre_stop_hooks {
            hook();
        }

        let _ = shutdown_tx.send(());
        let grace = self.config.termination_grace_period();
        debug!(grace_secs = grace.as_secs(), "draining in-flight streams");
        match tokio::time::timeout(grace, &mut server).await {
            Ok(Ok(Ok(()))) => debug!("server stopped cleanly"),
            Ok(Ok(Err(e))) => {
                error!(error = %e, "server stopped with transport error");
                return Err(e.into());
            }
            Ok(Err(join_err)) => error!(error = %join_err, "server task failed"),
            Err(_) => {
                warn!("grace period elapsed before streams drained, aborting");
                server.abort();
            }
        }

        debug!(hooks = self.post_stop_hooks.len(), "running post-stop hooks");
        for hook in self.post_stop_hooks {
            hook();
        }
        info!("ext_proc server shut down");
        Ok(())
    }
}

enum HealthEvent {
    Serving,
    NotServing,
    Failed,
}

/// Adapts the three health verbs to the async health reporter
///
/// `failed` latches: after it fires, `serving` reports are dropped.
struct HealthForwarder {
    tx: mpsc::UnboundedSender<HealthEvent>,
    failed: AtomicBool,
}

impl HealthSignal for HealthForwarder {
    fn serving(&self) {
        if !self.failed.load(Ordering::SeqCst) {
            let _ = self.tx.send(HealthEvent::Serving);
        }
    }

    fn not_serving(&self) {
        let _ = self.tx.send(HealthEvent::NotServing);
    }

    fn failed(&self) {
        self.failed.store(true, Ordering::SeqCst);
        let _ = self.tx.send(HealthEvent::Failed);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
