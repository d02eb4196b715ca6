//! Command-line host for `coordination` sessions against an
//! OpenAI-compatible inference server.

pub mod backend;
pub mod config;
pub mod display;
pub mod session;
pub mod sink;
