//! Per-query dispatcher: classifies each inbound question and drives the
//! matching resolution path.

use crate::dns::forwarding::{FilteredForwarder, UpstreamForwarder};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{rdata, DNSClass, RData, Record, RecordType};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use shunt_dns_domain::{BlockList, Config, RelayError};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// TTL for the locally synthesized auto-config answer.
const AUTOCONF_TTL: u32 = 600;

/// TTL for records re-synthesized from a filtered exchange.
const FILTERED_TTL: u32 = 300;

/// Resolution path chosen for one query. First match wins, exactly one path
/// per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPath {
    /// Reserved auto-config name, answered locally with no upstream call.
    Autoconf,
    /// Block-evasion domain, resolved through the forgery-discarding exchange.
    Filtered,
    /// Everything else, forwarded verbatim.
    Forward,
}

impl QueryPath {
    fn as_str(&self) -> &'static str {
        match self {
            QueryPath::Autoconf => "autoconf",
            QueryPath::Filtered => "filtered",
            QueryPath::Forward => "forward",
        }
    }
}

pub struct RelayHandler {
    forwarder: UpstreamForwarder,
    filtered: FilteredForwarder,
    block_list: BlockList,
    autoconf_name: String,
    autoconf_address: Ipv4Addr,
}

impl RelayHandler {
    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        let target = config.upstream.target().map_err(RelayError::Config)?;
        let timeout = Duration::from_millis(config.upstream.query_timeout_ms);

        let autoconf_address = config.autoconf.address.parse().map_err(|e| {
            RelayError::Config(format!(
                "Invalid autoconf address '{}': {}",
                config.autoconf.address, e
            ))
        })?;

        Ok(Self {
            forwarder: UpstreamForwarder::new(&target, timeout),
            filtered: FilteredForwarder::new(&target, timeout),
            block_list: config.blocking.block_list(),
            autoconf_name: config.autoconf.name.clone(),
            autoconf_address,
        })
    }

    fn normalize_domain(domain: &str) -> String {
        domain.trim_end_matches('.').to_string()
    }

    /// Classification order per query, first match wins. Only plain A/IN
    /// questions are eligible for the local and filtered paths; everything
    /// else goes upstream unmodified.
    fn classify(&self, domain: &str, record_type: RecordType, class: DNSClass) -> QueryPath {
        if record_type == RecordType::A && class == DNSClass::IN {
            if domain.starts_with(self.autoconf_name.as_str()) {
                return QueryPath::Autoconf;
            }
            if self.block_list.is_listed(domain) {
                return QueryPath::Filtered;
            }
        }
        QueryPath::Forward
    }
}

#[async_trait::async_trait]
impl RequestHandler for RelayHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let request_info = match request.request_info() {
            Ok(info) => info,
            Err(e) => {
                // The codec could not produce a question; nothing to answer.
                error!(client = %request.src(), error = %e, "Malformed request");
                return ResponseInfo::from(*request.header());
            }
        };

        let query = &request_info.query;
        let domain = Self::normalize_domain(&query.name().to_utf8());
        let client = request.src();
        let path = self.classify(&domain, query.query_type(), query.query_class());

        debug!(
            client = %client,
            domain = %domain,
            record_type = ?query.query_type(),
            path = path.as_str(),
            "Query classified"
        );

        match path {
            QueryPath::Autoconf => {
                let answers = vec![Record::from_rdata(
                    query.original().name().clone(),
                    AUTOCONF_TTL,
                    RData::A(rdata::A(self.autoconf_address)),
                )];
                info!(
                    client = %client,
                    domain = %domain,
                    path = path.as_str(),
                    address = %self.autoconf_address,
                    "Query answered locally"
                );
                send_answer_response(request, &mut response_handle, &answers).await
            }

            QueryPath::Filtered => match self.filtered.resolve(&domain).await {
                Ok(addresses) => {
                    let name = query.original().name().clone();
                    let answers: Vec<Record> = addresses
                        .iter()
                        .map(|ip| {
                            Record::from_rdata(
                                name.clone(),
                                FILTERED_TTL,
                                RData::A(rdata::A(*ip)),
                            )
                        })
                        .collect();
                    info!(
                        client = %client,
                        domain = %domain,
                        path = path.as_str(),
                        answers = answers.len(),
                        "Filtered query resolved"
                    );
                    send_answer_response(request, &mut response_handle, &answers).await
                }
                Err(e) => {
                    warn!(
                        client = %client,
                        domain = %domain,
                        path = path.as_str(),
                        error = %e,
                        "Filtered query failed"
                    );
                    send_failure_response(request, &mut response_handle).await
                }
            },

            QueryPath::Forward => match self.forwarder.forward(query.original()).await {
                Ok(answers) => {
                    info!(
                        client = %client,
                        domain = %domain,
                        record_type = ?query.query_type(),
                        path = path.as_str(),
                        answers = answers.len(),
                        "Query forwarded"
                    );
                    send_answer_response(request, &mut response_handle, &answers).await
                }
                Err(e) => {
                    warn!(
                        client = %client,
                        domain = %domain,
                        path = path.as_str(),
                        error = %e,
                        "Forwarded query failed"
                    );
                    send_failure_response(request, &mut response_handle).await
                }
            },
        }
    }
}

async fn send_answer_response<R: ResponseHandler>(
    request: &Request,
    response_handle: &mut R,
    answers: &[Record],
) -> ResponseInfo {
    let builder = MessageResponseBuilder::from_message_request(request);
    let mut header = *request.header();
    header.set_recursion_available(true);
    let response = builder.build(header, answers.iter(), &[], &[], &[]);

    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "Failed to send response");
            ResponseInfo::from(*request.header())
        }
    }
}

/// Timeout and transport failures all map to NXDOMAIN with no answers.
async fn send_failure_response<R: ResponseHandler>(
    request: &Request,
    response_handle: &mut R,
) -> ResponseInfo {
    let builder = MessageResponseBuilder::from_message_request(request);
    let mut header = *request.header();
    header.set_response_code(ResponseCode::NXDomain);
    header.set_recursion_available(true);
    let response = builder.build(header, &[], &[], &[], &[]);

    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "Failed to send failure response");
            ResponseInfo::from(*request.header())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shunt_dns_domain::Config;

    fn handler_with_suffixes(suffixes: &[&str]) -> RelayHandler {
        let mut config = Config::default();
        config.blocking.suffixes = suffixes.iter().map(|s| s.to_string()).collect();
        RelayHandler::from_config(&config).unwrap()
    }

    #[test]
    fn classifies_autoconf_before_blocklist() {
        // A name both starting with the reserved label and on the block list
        // still takes the local path; classification order is fixed.
        let handler = handler_with_suffixes(&["wpad.example"]);
        assert_eq!(
            handler.classify("wpad.example", RecordType::A, DNSClass::IN),
            QueryPath::Autoconf
        );
    }

    #[test]
    fn classifies_blocked_domain_as_filtered() {
        let handler = handler_with_suffixes(&["twitter.com"]);
        assert_eq!(
            handler.classify("twitter.com", RecordType::A, DNSClass::IN),
            QueryPath::Filtered
        );
        assert_eq!(
            handler.classify("api.twitter.com", RecordType::A, DNSClass::IN),
            QueryPath::Filtered
        );
    }

    #[test]
    fn non_a_queries_always_forward() {
        let handler = handler_with_suffixes(&["twitter.com"]);
        assert_eq!(
            handler.classify("twitter.com", RecordType::AAAA, DNSClass::IN),
            QueryPath::Forward
        );
        assert_eq!(
            handler.classify("wpad.lan", RecordType::MX, DNSClass::IN),
            QueryPath::Forward
        );
        assert_eq!(
            handler.classify("twitter.com", RecordType::A, DNSClass::CH),
            QueryPath::Forward
        );
    }

    #[test]
    fn unlisted_a_queries_forward() {
        let handler = handler_with_suffixes(&["twitter.com"]);
        assert_eq!(
            handler.classify("example.com", RecordType::A, DNSClass::IN),
            QueryPath::Forward
        );
    }

    #[test]
    fn normalize_strips_trailing_dot() {
        assert_eq!(RelayHandler::normalize_domain("wpad.lan."), "wpad.lan");
        assert_eq!(RelayHandler::normalize_domain("wpad.lan"), "wpad.lan");
    }
}
