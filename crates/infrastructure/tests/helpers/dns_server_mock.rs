//! In-process mock upstream resolver with scripted per-domain behavior.

use hickory_proto::op::{Message, MessageType, OpCode};
use hickory_proto::rr::rdata::{A, MX};
use hickory_proto::rr::{Name, RData, Record};
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// What the mock does with a query for a given domain.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Reply with these A records, in order.
    AnswerA { addresses: Vec<Ipv4Addr>, ttl: u32 },
    /// Reply with a single MX record.
    AnswerMx {
        preference: u16,
        exchange: &'static str,
        ttl: u32,
    },
    /// Race a bogus reply ahead of the real one, like an on-path injector.
    ForgedThenAnswer {
        forged: Ipv4Addr,
        addresses: Vec<Ipv4Addr>,
        ttl: u32,
    },
    /// Never reply; the relay must hit its timeout.
    Silent,
}

pub struct MockUpstream {
    addr: SocketAddr,
    queries_seen: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUpstream {
    pub async fn start(
        behaviors: HashMap<String, Behavior>,
        default: Behavior,
    ) -> std::io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?);
        let addr = socket.local_addr()?;
        let queries_seen = Arc::new(AtomicUsize::new(0));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let behaviors = Arc::new(behaviors);
        let counter = queries_seen.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { break };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let query = buf[..len].to_vec();
                        let socket = socket.clone();
                        let behaviors = behaviors.clone();
                        let default = default.clone();
                        tokio::spawn(async move {
                            respond(&socket, peer, &query, &behaviors, default).await;
                        });
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries_seen,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Mock that answers every domain the same way.
    pub async fn answering(addresses: Vec<Ipv4Addr>, ttl: u32) -> std::io::Result<Self> {
        Self::start(HashMap::new(), Behavior::AnswerA { addresses, ttl }).await
    }

    /// Mock that never answers anything.
    pub async fn silent() -> std::io::Result<Self> {
        Self::start(HashMap::new(), Behavior::Silent).await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries_seen(&self) -> usize {
        self.queries_seen.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn respond(
    socket: &UdpSocket,
    peer: SocketAddr,
    query_bytes: &[u8],
    behaviors: &HashMap<String, Behavior>,
    default: Behavior,
) {
    let Ok(query) = Message::from_vec(query_bytes) else {
        return;
    };
    let Some(question) = query.queries().first().cloned() else {
        return;
    };

    let domain = question.name().to_utf8().trim_end_matches('.').to_string();
    let behavior = behaviors.get(&domain).cloned().unwrap_or(default);

    match behavior {
        Behavior::Silent => {}
        Behavior::AnswerA { addresses, ttl } => {
            let answers = a_records(question.name(), &addresses, ttl);
            let _ = socket
                .send_to(&build_response(&query, answers), peer)
                .await;
        }
        Behavior::AnswerMx {
            preference,
            exchange,
            ttl,
        } => {
            let answers = vec![Record::from_rdata(
                question.name().clone(),
                ttl,
                RData::MX(MX::new(preference, Name::from_str(exchange).unwrap())),
            )];
            let _ = socket
                .send_to(&build_response(&query, answers), peer)
                .await;
        }
        Behavior::ForgedThenAnswer {
            forged,
            addresses,
            ttl,
        } => {
            let forged_answers = a_records(question.name(), &[forged], ttl);
            let _ = socket
                .send_to(&build_response(&query, forged_answers), peer)
                .await;
            tokio::time::sleep(Duration::from_millis(50)).await;
            let answers = a_records(question.name(), &addresses, ttl);
            let _ = socket
                .send_to(&build_response(&query, answers), peer)
                .await;
        }
    }
}

fn a_records(name: &Name, addresses: &[Ipv4Addr], ttl: u32) -> Vec<Record> {
    addresses
        .iter()
        .map(|ip| Record::from_rdata(name.clone(), ttl, RData::A(A(*ip))))
        .collect()
}

fn build_response(query: &Message, answers: Vec<Record>) -> Vec<u8> {
    let mut response = Message::new(query.id(), MessageType::Response, OpCode::Query);
    response.set_recursion_desired(query.recursion_desired());
    response.set_recursion_available(true);
    for q in query.queries() {
        response.add_query(q.clone());
    }
    for answer in answers {
        response.add_answer(answer);
    }
    response.to_vec().expect("mock response must serialize")
}
