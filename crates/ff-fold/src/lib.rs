//! Constant folding for Fortran expression trees: shape analysis,
//! elementwise lifting of scalar operations over conformable arrays,
//! array-constructor evaluation with implied-DO iteration, and partial
//! evaluation of the supported intrinsic procedures.
//!
//! The entry point is [`fold::fold`]: it consumes an owned expression,
//! reduces every statically evaluable subexpression under a
//! [`context::FoldingContext`], and returns a tree that is at least as
//! reduced as its input. Arithmetic hazards are reported through the
//! context's diagnostic buffer; the recursion always completes.

pub mod context;
pub mod fold;
pub mod host;
pub mod shape;

pub use context::{FoldingContext, FoldingOptions};
pub use fold::fold;
