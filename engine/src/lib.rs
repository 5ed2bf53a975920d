//! # Treewalk Engine - Recursive Filesystem-Tree Library
//!
//! A headless engine for counting, deleting, mirror-copying, and comparing
//! directory trees. Designed as the foundation for multiple front ends
//! (CLI, automation).
//!
//! ## Overview
//!
//! One depth-first traversal engine drives every operation. Specializations
//! plug delete/copy/record effects into the shared counting visitor through
//! strategy hooks; there is no inheritance chain and no second walker.
//! Every operation returns a [`PathCounters`] describing what was visited.
//!
//! Traversal is single-threaded and synchronous. One facade call performs
//! exactly one complete walk (two, for tree-to-tree comparison) before
//! returning. The first error aborts the remaining walk and propagates.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{ops, CounterKind, WalkOptions};
//!
//! # fn main() -> Result<(), engine::WalkError> {
//! let options = WalkOptions::new();
//!
//! // Count a tree.
//! let counters = ops::count("/data/reports", &options, CounterKind::Exact)?;
//! println!("{counters}");
//!
//! // Mirror it elsewhere, then verify the copy byte for byte.
//! ops::copy_directory("/data/reports", "/backup/reports", &options, &[], CounterKind::Fixed)?;
//! assert!(ops::content_equals("/data/reports", "/backup/reports", &options)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **counters**: Counter and PathCounters accumulators
//! - **error**: Error types and handling
//! - **filter**: VisitOutcome and path filters
//! - **walk**: The depth-first traversal engine and TreeVisitor trait
//! - **counting**: The shared counting visitor and its extension hooks
//! - **delete**, **copy**, **accumulate**: The visitor specializations
//! - **compare**: Shape and content tree equality
//! - **fs_ops**: Low-level filesystem primitives
//! - **ops**: The one-call-per-walk facade

pub mod accumulate;
pub mod compare;
pub mod copy;
pub mod counters;
pub mod counting;
pub mod delete;
pub mod error;
pub mod filter;
pub mod fs_ops;
pub mod ops;
pub mod walk;

// Re-export the main types.
pub use accumulate::AccumulateHooks;
pub use copy::{CopyHooks, CopyOption};
pub use counters::{Counter, CounterKind, CounterSnapshot, PathCounters};
pub use counting::{CountOnly, CountingVisitor, VisitHooks};
pub use delete::{DeleteHooks, DeleteOption};
pub use error::WalkError;
pub use filter::{AcceptAll, NameFilter, PathFilter, RejectSymlinks, VisitOutcome};
pub use walk::{walk, TreeVisitor, WalkOptions};
