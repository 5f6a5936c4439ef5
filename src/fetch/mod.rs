// src/fetch/mod.rs

//! Package transfer
//!
//! Each URL goes through the same steps: work out its destination from
//! the layout, decide from the previous manifest whether the local copy
//! can be trusted, and otherwise stream it down over HTTP.

mod client;
mod decision;
mod download;

pub use client::{partial_path, TransferClient};
pub use decision::{decide, FetchDecision, RemoteProbe};
pub use download::{fetch_package, FetchOutcome};
