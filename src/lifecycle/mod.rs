//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! SIGINT (signals.rs)
//!     → Cancellation::cancel (cancel.rs)
//!     → every CancelToken::run resolves to Cancelled
//! ```

pub mod cancel;
pub mod signals;

pub use cancel::{CancelToken, Cancellation, Cancelled};
