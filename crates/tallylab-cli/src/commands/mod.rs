//! Subcommand implementations.

pub(crate) mod address;
pub(crate) mod check;
pub(crate) mod database;
pub(crate) mod keys;
pub(crate) mod policy;
