//! Shunt DNS infrastructure layer: upstream transports, wire-format
//! forwarding on top of `hickory-proto`, the per-query dispatcher and the
//! relay lifecycle built on `hickory-server`.
pub mod dns;
