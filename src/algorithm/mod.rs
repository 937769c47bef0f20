//! Vectorized operations over arrays of geometry handles.

pub mod broadcast;
pub mod catalog;
pub mod engine;
pub(crate) mod kernel;
pub mod output;
pub mod prepared;

pub use broadcast::{broadcast_shapes, BroadcastPlan};
pub use catalog::{Arity, Operation, OperationKind, OperationSignature, Predicate};
pub use engine::DispatchEngine;
pub use output::{BatchErrors, BatchOutput, BatchValues, ElementFailure, Exploded};
pub use prepared::{PreparedCache, PreparedCacheStats};
