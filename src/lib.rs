//! solmark: NatSpec documentation from Solidity build-info artifacts.
//!
//! The pipeline reads a compiler build-info ([`build_info`]), resolves each
//! contract's declarations, signatures and NatSpec ([`parser`]) into a
//! [`model::ContractInfo`], and renders it ([`render`]). [`generator`] ties
//! the steps together for whole builds.

pub mod build_info;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod render;
pub mod toc;

pub use error::{Error, Result};
pub use generator::{generate, GeneratorConfig};
