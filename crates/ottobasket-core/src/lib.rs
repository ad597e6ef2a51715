// Library root: stat loading, configuration and the valuation engine, shared
// by the command-line runner and the integration tests.

pub mod config;
pub mod output;
pub mod projection;
pub mod roster;
pub mod stats;
pub mod valuation;
