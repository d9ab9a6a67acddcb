//! DNS message builder
//!
//! Constructs upstream query messages in wire format using `hickory-proto`.
//! Every query carries a fresh random ID so the caller can match the reply
//! against the request it issued.

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use shunt_dns_domain::RelayError;
use std::str::FromStr;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Wrap an inbound question, unmodified, in a fresh recursive query.
    ///
    /// Used by the generic path: whatever type and class the client asked
    /// for goes upstream verbatim.
    pub fn build_forward(question: &Query) -> Result<(u16, Vec<u8>), RelayError> {
        let id = fastrand::u16(..);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(question.clone());

        let bytes = Self::serialize_message(&message)?;
        Ok((id, bytes))
    }

    /// Build a plain `{name, A, IN}` query for the filtered path.
    pub fn build_address_query(domain: &str) -> Result<(u16, Vec<u8>), RelayError> {
        let name = Name::from_str(domain)
            .map_err(|e| RelayError::InvalidName(format!("Invalid domain '{}': {}", domain, e)))?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordType::A);
        query.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let bytes = Self::serialize_message(&message)?;
        Ok((id, bytes))
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, RelayError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            RelayError::InvalidName(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
