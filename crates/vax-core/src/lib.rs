pub mod catalog;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod filter;
pub mod io;
pub mod options;
pub mod paths;
pub mod session;
pub mod steps;
pub mod types;
pub mod wire;

pub use error::{Result, VaxError};
