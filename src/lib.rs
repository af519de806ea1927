pub mod cli;
pub mod collector;
pub mod config;
pub mod observability;
pub mod plugin;
pub mod td;
