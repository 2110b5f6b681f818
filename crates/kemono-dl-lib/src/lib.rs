pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod http;
pub mod post;

#[cfg(test)]
mod test_support;

pub use crate::config::Config;
pub use error::KemonoDlError;
