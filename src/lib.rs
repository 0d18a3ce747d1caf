pub mod config;
pub mod dto;
pub mod server;
pub mod trace;

pub use trace::{trace_log, trace_request, Logger};
