//! DogMove input schema
//!
//! This module defines the fixed column layout of the DogMove file and the
//! adapter that reads delimited rows into typed records.

mod adapter;
mod columns;

pub use adapter::*;
pub use columns::*;
