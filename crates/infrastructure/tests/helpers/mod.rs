#![allow(dead_code)]
pub mod dns_server_mock;
pub mod test_client;

pub use dns_server_mock::{Behavior, MockUpstream};
pub use test_client::{tcp_query, udp_query};
