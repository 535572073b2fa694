//! Flowpilot Workflow
//!
//! This crate provides the workflow graph model for flowpilot. A workflow is a
//! set of nodes (UI actions such as `Click` or `Type`) wired together by
//! connections between named ports.
//!
//! Nodes and connections live in flat id-keyed maps and connections refer to
//! nodes by id only, so any graph shape (cycles included) can be represented
//! and dropped without reference counting.
//!
//! The mutation API performs no validation. Structural rules (a single Start
//! node, no dangling connections, no cycles) are checked separately by
//! `flowpilot-validator`.

mod connection;
mod document;
mod error;
mod node;
mod workflow;

pub use connection::Connection;
pub use document::WorkflowDocument;
pub use error::WorkflowError;
pub use node::{Node, NodeKind};
pub use workflow::Workflow;
