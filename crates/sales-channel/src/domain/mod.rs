//! # Domain Module
//!
//! Core domain types: channels, commands, submissions, errors.

pub mod command;
pub mod entities;
pub mod errors;
pub mod submission;
pub mod value_objects;

pub use command::*;
pub use entities::*;
pub use errors::*;
pub use submission::*;
pub use value_objects::*;
