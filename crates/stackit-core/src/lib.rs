//! Client library for the StackIt Q&A forum.

pub mod api;
pub mod config;
pub mod forum;
pub mod logging;
pub mod render;
pub mod session;
pub mod token_store;

#[cfg(test)]
mod test_support;
