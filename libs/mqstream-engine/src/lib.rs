pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod error;
pub mod invoker;
pub mod route;
pub mod worker;
