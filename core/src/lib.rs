//! Core orchestration for Genie.
//!
//! # Architecture
//!
//! - [`planner`] - pure target selection over an immutable snapshot of
//!   the configuration and the existing posts.
//! - [`store`] - the ordered post collection; every mutation is applied
//!   by id against the latest snapshot.
//! - [`orchestrator`] - the controller that claims targets, drives the
//!   provider client, and reconciles results back into the store.
//! - [`export`] - pure text export of a post.
//!
//! Data flow: settings snapshot -> planner -> orchestrator -> provider
//! client -> store -> consumer.

pub mod export;
pub mod orchestrator;
pub mod planner;
pub mod store;

pub use export::export_post_as_text;
pub use orchestrator::{ImageFlowOutcome, Orchestrator, RejectReason, TextFlowOutcome};
pub use store::PostStore;
