#![deny(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::redundant_field_names)]
#![deny(clippy::needless_borrow)]
#![deny(clippy::manual_let_else)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::print_stdout)]
#![deny(clippy::dbg_macro)]
#![cfg_attr(not(test), no_std)]

//! Channel execution engine for fraktor streams.
//!
//! Stream and sink combinators compile to [`core::ChannelProgram`] values. A single
//! interpreter, [`core::ChannelExecutor`], walks those programs one step at a time
//! with an explicit continuation stack, composes flat-mapped child programs through
//! a sub-executor state machine and guarantees that every finalizer runs exactly
//! once. The `core` module is `no_std`; the `std` module wires the engine to tokio.

extern crate alloc;

pub mod core;
#[cfg(feature = "std")]
pub mod std;
