// Library root: re-exports all modules so integration tests and the binary
// share the same router, config, and wire types.

pub mod api;
pub mod config;
pub mod protocol;
pub mod server;
