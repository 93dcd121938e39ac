pub mod config;
pub mod digest;
pub mod error;
pub mod io;
pub mod paths;
pub mod reader;
pub mod report;
pub mod snapshot;
pub mod writer;

pub use error::{RecallError, Result};
