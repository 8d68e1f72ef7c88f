//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! builder / pipeline / node client
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//! ```

pub mod logging;
pub mod metrics;
