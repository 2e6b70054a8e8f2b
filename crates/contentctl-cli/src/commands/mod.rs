//! Command handlers grouped by concern.

pub(crate) mod operation;
pub(crate) mod operations;
pub(crate) mod stream;
