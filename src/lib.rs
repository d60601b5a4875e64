// ABOUTME: Public library API for the Canvas to Things converter
// ABOUTME: Re-exports core modules for external use

pub mod api;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod issue;
pub mod query;
pub mod storage;
pub mod sync;
pub mod things;
pub mod url;
pub mod util;

pub use error::{Error, Result};
pub use issue::{Issue, Issues};
