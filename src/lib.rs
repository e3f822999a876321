pub mod agent;
pub mod config;
pub mod error;
pub mod platform;
pub mod webhook;
pub mod workflow;
pub mod workspace;
