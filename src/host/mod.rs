//! Backend boundary: wire contract, gateway trait and its transports.

pub mod api;
pub mod channel;
pub mod contract;
pub mod gateway;
pub mod stdio;
