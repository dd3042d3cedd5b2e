//! Semantic analysis: declaration and static divisor checking.

pub mod checker;

pub use checker::SemanticChecker;
