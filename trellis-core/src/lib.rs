//! Trellis Core
//!
//! This crate provides an incremental, interruptible reconciler: it renders a
//! tree of declarative virtual nodes into a live output tree, a few units of
//! work at a time, yielding to the host between bursts.
//! It implements:
//!
//! - The node model (tags, text, stateless components, keys and refs)
//! - A thread-safe in-memory output tree with an opt-in mutation journal
//! - A breadth-first, budgeted work loop with prop diffing
//! - Per-mount-target roots that support render, update and unmount
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `vnode`: Immutable virtual nodes and the builder that normalizes them
//! - `dom`: The output tree the reconciler writes into
//! - `host`: Idle scheduling facilities and deadlines
//! - `fiber`: Work units, schedule state, the registry and the work loop
//! - `root`: The public render/update/unmount surface
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis_core::{acquire_root, create_element, Document, ManualScheduler, RawProps};
//!
//! let doc = Document::new();
//! let mount = doc.create_element("main");
//! let host = Arc::new(ManualScheduler::new());
//! let root = acquire_root(&mount, host.clone(), None);
//!
//! // Describe the tree
//! let tree = create_element("div", Some(RawProps::new().attr("id", "x")), ["hello"])?;
//!
//! // Render it, one unit of work per idle callback
//! root.render(tree)?;
//! host.run_bursts(1)?;
//!
//! assert_eq!(mount.to_markup(), r#"<main><div id="x">hello</div></main>"#);
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod fiber;
pub mod host;
pub mod root;
pub mod vnode;

pub use config::{ChildMatching, RootOptions, SchedulerConfig};
pub use dom::{Document, Mutation, Node, NodeId};
pub use error::{Error, Result};
pub use host::{Deadline, IdleScheduler, ManualScheduler, TokioScheduler};
pub use root::{acquire_root, Root};
pub use vnode::{create_element, text, Child, Children, Component, RawProps, VNode};
