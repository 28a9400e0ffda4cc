//! Project analyzers feeding the env check

pub mod env;
pub mod node;
