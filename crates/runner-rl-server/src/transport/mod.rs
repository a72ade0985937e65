//! Server transports

pub mod stdio;
