//! Local shell and git access

pub mod git;
pub mod shell;
