pub mod forwarding;
pub mod handler;
pub mod relay;
pub mod transport;

pub use handler::RelayHandler;
pub use relay::Relay;
