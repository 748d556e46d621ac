pub mod api;
pub mod cli;
pub mod idempotency;
pub mod monitor;
pub mod state;
pub mod worker;
