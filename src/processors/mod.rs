//! Builtin sample processors
//!
//! These exercise the processor contract end to end and back the
//! integration tests. `digest` and `dedup` are the interesting ones: they
//! keep cross-stream state behind a mutex and show business rejection via
//! `cancel_request`.

pub mod dedup;
pub mod digest;
pub mod echo;
pub mod noop;
pub mod timer;
pub mod trivial;

pub use dedup::DedupProcessor;
pub use digest::DigestProcessor;
pub use echo::EchoProcessor;
pub use noop::NoOpProcessor;
pub use timer::TimerProcessor;
pub use trivial::TrivialProcessor;
