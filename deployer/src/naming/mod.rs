//! Name resolution: branch name to deployment identifiers

pub mod resolver;
pub mod slug;
