//! Minimal raw DNS clients for exercising a running relay.

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

const CLIENT_RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn build_query(domain: &str, record_type: RecordType) -> Vec<u8> {
    let mut question = Query::new();
    question.set_name(Name::from_str(domain).unwrap());
    question.set_query_type(record_type);
    question.set_query_class(DNSClass::IN);

    let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(question);
    message.to_vec().unwrap()
}

pub async fn udp_query(server: SocketAddr, domain: &str, record_type: RecordType) -> Message {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket
        .send_to(&build_query(domain, record_type), server)
        .await
        .unwrap();

    let mut buf = vec![0u8; 4096];
    let (len, _) = tokio::time::timeout(CLIENT_RECV_TIMEOUT, socket.recv_from(&mut buf))
        .await
        .expect("relay did not answer in time")
        .unwrap();
    Message::from_vec(&buf[..len]).unwrap()
}

pub async fn tcp_query(server: SocketAddr, domain: &str, record_type: RecordType) -> Message {
    let mut stream = TcpStream::connect(server).await.unwrap();
    let request = build_query(domain, record_type);

    stream
        .write_all(&(request.len() as u16).to_be_bytes())
        .await
        .unwrap();
    stream.write_all(&request).await.unwrap();

    let reply = tokio::time::timeout(CLIENT_RECV_TIMEOUT, async {
        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await.unwrap();
        let len = u16::from_be_bytes(len_buf) as usize;
        let mut msg_buf = vec![0u8; len];
        stream.read_exact(&mut msg_buf).await.unwrap();
        msg_buf
    })
    .await
    .expect("relay did not answer in time");

    Message::from_vec(&reply).unwrap()
}
