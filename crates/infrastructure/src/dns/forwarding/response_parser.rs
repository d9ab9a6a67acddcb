use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, Record};
use shunt_dns_domain::RelayError;
use std::net::Ipv4Addr;
use tracing::debug;

/// One parsed upstream reply.
///
/// `answers` holds the answer section verbatim, in received order; the
/// generic path adopts it untouched. The filtered path only wants bare IPv4
/// addresses, via [`UpstreamAnswer::ipv4_addresses`].
#[derive(Debug, Clone)]
pub struct UpstreamAnswer {
    pub id: u16,
    pub rcode: ResponseCode,
    pub truncated: bool,
    pub answers: Vec<Record>,
}

impl UpstreamAnswer {
    pub fn ipv4_addresses(&self) -> Vec<Ipv4Addr> {
        self.answers
            .iter()
            .filter_map(|record| match record.data() {
                RData::A(a) => Some(a.0),
                _ => None,
            })
            .collect()
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<UpstreamAnswer, RelayError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            RelayError::BadResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        let answer = UpstreamAnswer {
            id: message.id(),
            rcode: message.response_code(),
            truncated: message.truncated(),
            answers: message.answers().to_vec(),
        };

        debug!(
            id = answer.id,
            rcode = ?answer.rcode,
            answers = answer.answers.len(),
            truncated = answer.truncated,
            "DNS response parsed"
        );

        Ok(answer)
    }
}
