//! Types shared between the userkey server and anything that talks to it:
//! request/response bodies, token claims and the TOML configuration.

pub mod config;
pub mod types;
