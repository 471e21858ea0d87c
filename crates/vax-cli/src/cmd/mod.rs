pub mod catalog;
pub mod config;
pub mod connect;
pub mod eligibility;
pub mod init;
pub mod serve;
