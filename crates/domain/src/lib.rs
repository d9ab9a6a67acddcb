//! Shunt DNS domain layer: configuration, block list, upstream addressing
//! and the error taxonomy. No I/O happens here.
pub mod blocklist;
pub mod config;
pub mod errors;
pub mod upstream;

pub use blocklist::BlockList;
pub use config::Config;
pub use errors::RelayError;
pub use upstream::UpstreamTarget;
