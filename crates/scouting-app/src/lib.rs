// Library root for the `scout` binary: config, loading, the run driver,
// storage and the report, exposed for the integration tests.

pub mod config;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod store;
