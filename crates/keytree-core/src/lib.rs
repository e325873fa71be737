//! Core systems for keytree.
//!
//! This crate provides the foundational pieces the tree model is built on:
//!
//! - **Signal/Slot System**: Type-safe, reentrant, synchronous notifications
//! - **Errors**: Error types shared by the core systems
//! - **Logging**: `tracing` targets, span names and a timing span
//!
//! # Signal/Slot Example
//!
//! ```
//! use keytree_core::Signal;
//!
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! let conn_id = rows_inserted.connect(|(first, last)| {
//!     println!("rows {first}..={last} inserted");
//! });
//!
//! rows_inserted.emit((0, 4));
//! rows_inserted.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::SignalError;
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
