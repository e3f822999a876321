//! Adapters for the external collaborators that change the checkout: an agent
//! command and an optional shell validation command.

pub mod command;
pub mod validate;
