use super::message_builder::MessageBuilder;
use super::response_parser::{ResponseParser, UpstreamAnswer};
use crate::dns::transport::{create_transport, Transport};
use hickory_proto::op::Query;
use hickory_proto::rr::Record;
use shunt_dns_domain::{RelayError, UpstreamTarget};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::debug;

fn checked(answer: UpstreamAnswer, expected_id: u16) -> Result<UpstreamAnswer, RelayError> {
    if answer.id != expected_id {
        return Err(RelayError::BadResponse(format!(
            "Reply ID {} does not match query ID {}",
            answer.id, expected_id
        )));
    }
    Ok(answer)
}

/// Generic upstream forwarder: one question out, the full answer set back.
///
/// The inbound question is forwarded verbatim; whatever record sequence the
/// upstream returns is handed to the dispatcher untouched.
pub struct UpstreamForwarder {
    transport: Transport,
    timeout: Duration,
}

impl UpstreamForwarder {
    pub fn new(target: &UpstreamTarget, timeout: Duration) -> Self {
        Self {
            transport: create_transport(target, false),
            timeout,
        }
    }

    pub async fn forward(&self, question: &Query) -> Result<Vec<Record>, RelayError> {
        let (id, request_bytes) = MessageBuilder::build_forward(question)?;

        let reply = self.transport.send(&request_bytes, self.timeout).await?;
        let answer = checked(ResponseParser::parse(&reply.bytes)?, id)?;

        debug!(
            question = %question.name(),
            answers = answer.answers.len(),
            protocol = reply.protocol_used,
            "Upstream exchange complete"
        );

        Ok(answer.answers)
    }
}

/// Filtered forwarder for block-evasion domains.
///
/// Asks only `{name, A, IN}` with the forged-reply discard hint on the
/// transport, and reduces the accepted reply to bare IPv4 addresses; the
/// dispatcher re-synthesizes records from them.
pub struct FilteredForwarder {
    transport: Transport,
    timeout: Duration,
}

impl FilteredForwarder {
    pub fn new(target: &UpstreamTarget, timeout: Duration) -> Self {
        Self {
            transport: create_transport(target, true),
            timeout,
        }
    }

    pub async fn resolve(&self, domain: &str) -> Result<Vec<Ipv4Addr>, RelayError> {
        let (id, request_bytes) = MessageBuilder::build_address_query(domain)?;

        let reply = self.transport.send(&request_bytes, self.timeout).await?;
        let answer = checked(ResponseParser::parse(&reply.bytes)?, id)?;

        let addresses = answer.ipv4_addresses();
        debug!(
            domain = %domain,
            addresses = addresses.len(),
            protocol = reply.protocol_used,
            "Filtered exchange complete"
        );

        Ok(addresses)
    }
}
