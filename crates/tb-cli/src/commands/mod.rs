//! CLI command implementations

pub(crate) mod adapter;
pub(crate) mod attributes;
pub(crate) mod command;
pub(crate) mod common;
pub(crate) mod deps;
pub(crate) mod query;
pub(crate) mod run;
pub(crate) mod sources;
