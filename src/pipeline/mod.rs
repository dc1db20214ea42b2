//! Chain parsing and sequential execution.

/// `op1=param1,op2` parsing.
pub mod chain;
/// Compile-then-run executor.
pub mod executor;
