pub mod branch;
pub mod git;
pub mod manager;
pub mod process;

pub use manager::Workspace;
