//! Core types, aggregation, and errors for the search dashboard.

pub mod aggregate;
pub mod dates;
pub mod error;
pub mod limits;
pub mod report;
pub mod tables;
pub mod upload;

pub use aggregate::*;
pub use dates::*;
pub use error::{Error, Result};
pub use report::*;
pub use tables::*;
pub use upload::*;
