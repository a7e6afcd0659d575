pub mod git;
pub mod runtime;
