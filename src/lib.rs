//! SEULA - Pluggable Envoy External Processor
//!
//! Engine for Envoy's `ext_proc` filter: Envoy opens a bidirectional gRPC
//! stream and ships each HTTP exchange through it phase by phase. This crate
//! owns the stream plumbing, per-request bookkeeping, and response encoding
//! so processors only implement six plain callbacks.
//!
//! # Architecture
//!
//! ```text
//! Envoy ──► ExtProcService ──► RequestContext ──► RequestProcessor
//!                 │                  │
//!                 └── phase routing  └── mutation buffer / response encoding
//! ```
//!
//! Processors are pluggable via the [`RequestProcessor`] trait and resolved
//! by name through the [`registry::ProcessorRegistry`].

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod config;
pub mod context;
pub mod error;
pub mod phase;
pub mod processor;
pub mod processors;
pub mod registry;
pub mod server;
pub mod service;

// Proto types generated from the Envoy ext_proc v3 definitions
pub mod proto {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    pub mod envoy {
        pub mod config {
            pub mod core {
                pub mod v3 {
                    include!("proto/envoy.config.core.v3.rs");
                }
            }
        }
        pub mod r#type {
            pub mod v3 {
                include!("proto/envoy.type.v3.rs");
            }
        }
        pub mod service {
            pub mod ext_proc {
                pub mod v3 {
                    include!("proto/envoy.service.ext_proc.v3.rs");
                }
            }
        }
    }
}

pub use config::{Config, ProcessingOptions};
pub use context::RequestContext;
pub use error::{Result, SeulaError};
pub use phase::Phase;
pub use processor::{HealthSignal, RequestProcessor};
pub use registry::ProcessorRegistry;
pub use server::ExtProcServer;
pub use service::ExtProcService;
