//! Core data model for the semantic layer of a Fortran front end:
//! intrinsic types and kinds, compile-time scalar values with faithful
//! overflow/rounding/flag reporting, and the owned expression tree that
//! the constant folder rewrites.
//!
//! Expressions are trees, not DAGs: every child is uniquely owned by its
//! parent, so `Box<Expr>` is fine and both deep copy and move are cheap
//! to reason about.

#[macro_use]
pub mod macros;

pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod span;
pub mod symbol;
pub mod types;
pub mod value;

pub use tracing;

pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
