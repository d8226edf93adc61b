pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod state;
