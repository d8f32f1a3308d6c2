//! The SMSC simulator engine: accepts ESME sessions over TCP, answers
//! the UCP operations and fans injected mobile-originated messages out to
//! every live session.

pub mod broadcast;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod keepalive;
pub mod metrics;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;
