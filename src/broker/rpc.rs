//! # Broker RPC
//!
//! The remote surface modules use to reach the broker: a small
//! request/response protocol over TCP, one frame per call.
//!
//! Frames are magic-prefixed and length-delimited (`RGNT`, version byte,
//! u32 payload length, bincode payload); oversized or mismatched frames are
//! rejected before any payload is parsed. Operation names and signatures
//! preserve the original wire contract: `getMsgNum`, `getTimestamp`,
//! `addModule`, `subscribeTo`, `sendMessage`, with boolean results carried
//! as 0/1 integers.

use bytes::{Buf, BufMut, BytesMut};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{Decoder, Encoder, Framed};
use tracing::{debug, error, info, warn};

use crate::broker::registry::SubscribeTarget;
use crate::broker::Broker;
use crate::config::{MAX_PACKET_LENGTH, PROTOCOL_VERSION};
use crate::error::{ProtocolError, Result};

/// Magic bytes identifying an RPC frame ("RGNT")
pub const RPC_MAGIC: [u8; 4] = [0x52, 0x47, 0x4E, 0x54];

/// Frame header: magic + version + payload length
const FRAME_HEADER: usize = 9;

/// Max allowed RPC frame payload; a `sendMessage` call carries at most one
/// datagram plus enum overhead, so this is generous
const MAX_FRAME_SIZE: usize = 8 * 1024;

/// One remote call to the broker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BrokerRequest {
    GetMsgNum,
    GetTimestamp,
    AddModule {
        module_id: i32,
        ip: String,
        port: i32,
    },
    SubscribeTo {
        subscriber_id: i32,
        target_id: i32,
    },
    SendMessage {
        packet: Vec<u8>,
        length: u16,
        sending_module: i32,
    },
}

/// The broker's reply. `Status` carries 1 for success, 0 for failure, as
/// the original contract did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BrokerResponse {
    MsgNum(i32),
    Timestamp(f64),
    Status(i32),
}

/// Length-delimited frame codec for RPC payloads
pub struct RpcCodec;

impl Decoder for RpcCodec {
    type Item = BytesMut;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>> {
        if src.len() < FRAME_HEADER {
            return Ok(None);
        }
        if src[0..4] != RPC_MAGIC || src[4] != PROTOCOL_VERSION {
            return Err(ProtocolError::InvalidFrame);
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&src[5..9]);
        let len = u32::from_le_bytes(len_bytes) as usize;
        if len > MAX_FRAME_SIZE {
            return Err(ProtocolError::OversizedPacket(len));
        }

        if src.len() < FRAME_HEADER + len {
            src.reserve(FRAME_HEADER + len - src.len());
            return Ok(None);
        }

        src.advance(FRAME_HEADER);
        Ok(Some(src.split_to(len)))
    }
}

impl Encoder<Vec<u8>> for RpcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<()> {
        if item.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::OversizedPacket(item.len()));
        }
        dst.reserve(FRAME_HEADER + item.len());
        dst.put_slice(&RPC_MAGIC);
        dst.put_u8(PROTOCOL_VERSION);
        dst.put_u32_le(item.len() as u32);
        dst.put_slice(&item);
        Ok(())
    }
}

fn status(result: Result<()>) -> BrokerResponse {
    match result {
        Ok(()) => BrokerResponse::Status(1),
        Err(e) => {
            warn!(error = %e, "RPC operation failed");
            BrokerResponse::Status(0)
        }
    }
}

/// Execute one request against the broker
pub async fn handle_request(broker: &Broker, request: BrokerRequest) -> BrokerResponse {
    match request {
        BrokerRequest::GetMsgNum => BrokerResponse::MsgNum(broker.msg_num() as i32),
        BrokerRequest::GetTimestamp => BrokerResponse::Timestamp(broker.timestamp()),
        BrokerRequest::AddModule {
            module_id,
            ip,
            port,
        } => match u16::try_from(port) {
            Ok(port) => status(broker.add_module(module_id, &ip, port).await),
            Err(_) => {
                warn!(module = module_id, port, "Port out of range");
                BrokerResponse::Status(0)
            }
        },
        BrokerRequest::SubscribeTo {
            subscriber_id,
            target_id,
        } => status(
            broker
                .subscribe_to(subscriber_id, SubscribeTarget::from_wire(target_id))
                .await,
        ),
        BrokerRequest::SendMessage {
            packet,
            length,
            sending_module,
        } => {
            let length = usize::from(length);
            if length > packet.len() {
                warn!(
                    sender = sending_module,
                    length,
                    actual = packet.len(),
                    "Declared packet length exceeds payload"
                );
                return BrokerResponse::Status(0);
            }
            status(broker.send_message(&packet[..length], sending_module).await)
        }
    }
}

/// Run the broker's RPC accept loop until the shutdown channel fires.
///
/// Each module connection gets its own task; a bad frame closes that one
/// connection, never the endpoint.
pub async fn serve(
    broker: Arc<Broker>,
    listener: TcpListener,
    mut shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    info!(address = %listener.local_addr()?, "Broker RPC endpoint listening");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Shutting down broker RPC endpoint");
                return Ok(());
            }

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, addr)) => {
                        debug!(peer = %addr, "Module connected");
                        let broker = Arc::clone(&broker);
                        tokio::spawn(async move {
                            serve_connection(broker, stream, addr).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Error accepting connection");
                    }
                }
            }
        }
    }
}

async fn serve_connection(broker: Arc<Broker>, stream: TcpStream, addr: SocketAddr) {
    let mut framed = Framed::new(stream, RpcCodec);

    while let Some(frame) = framed.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!(peer = %addr, error = %e, "Bad RPC frame, closing connection");
                break;
            }
        };

        let request: BrokerRequest = match bincode::deserialize(&frame) {
            Ok(request) => request,
            Err(e) => {
                warn!(peer = %addr, error = %e, "Undecodable RPC request, closing connection");
                break;
            }
        };

        let response = handle_request(&broker, request).await;
        let bytes = match bincode::serialize(&response) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(peer = %addr, error = %e, "Failed to serialize RPC response");
                break;
            }
        };

        if let Err(e) = framed.send(bytes).await {
            warn!(peer = %addr, error = %e, "Failed to send RPC response");
            break;
        }
    }

    debug!(peer = %addr, "Module connection closed");
}

/// Client side of the broker RPC, used by module processes
pub struct BrokerClient {
    framed: Framed<TcpStream, RpcCodec>,
}

impl BrokerClient {
    /// Connect to the broker's RPC endpoint
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        debug!(broker = %addr, "Connected to broker");
        Ok(Self {
            framed: Framed::new(stream, RpcCodec),
        })
    }

    async fn call(&mut self, request: &BrokerRequest) -> Result<BrokerResponse> {
        let bytes = bincode::serialize(request)?;
        self.framed.send(bytes).await?;
        let frame = self
            .framed
            .next()
            .await
            .ok_or(ProtocolError::ConnectionClosed)??;
        Ok(bincode::deserialize(&frame)?)
    }

    /// Fetch the next broker-issued sequence number
    pub async fn get_msg_num(&mut self) -> Result<i32> {
        match self.call(&BrokerRequest::GetMsgNum).await? {
            BrokerResponse::MsgNum(n) => Ok(n),
            _ => Err(ProtocolError::UnexpectedResponse),
        }
    }

    /// Fetch seconds elapsed since broker start
    pub async fn get_timestamp(&mut self) -> Result<f64> {
        match self.call(&BrokerRequest::GetTimestamp).await? {
            BrokerResponse::Timestamp(t) => Ok(t),
            _ => Err(ProtocolError::UnexpectedResponse),
        }
    }

    /// Register this module's inbound address with the broker
    pub async fn add_module(&mut self, module_id: i32, ip: &str, port: i32) -> Result<bool> {
        let request = BrokerRequest::AddModule {
            module_id,
            ip: ip.to_owned(),
            port,
        };
        match self.call(&request).await? {
            BrokerResponse::Status(s) => Ok(s != 0),
            _ => Err(ProtocolError::UnexpectedResponse),
        }
    }

    /// Subscribe to another module's traffic (or all modules via the
    /// reserved broadcast id)
    pub async fn subscribe_to(&mut self, subscriber_id: i32, target_id: i32) -> Result<bool> {
        let request = BrokerRequest::SubscribeTo {
            subscriber_id,
            target_id,
        };
        match self.call(&request).await? {
            BrokerResponse::Status(s) => Ok(s != 0),
            _ => Err(ProtocolError::UnexpectedResponse),
        }
    }

    /// Publish a packet through the broker to this module's subscribers.
    ///
    /// Rejects packets over [`MAX_PACKET_LENGTH`] before anything goes on
    /// the wire; the declared length would otherwise truncate to u16.
    pub async fn send_message(&mut self, packet: &[u8], sending_module: i32) -> Result<bool> {
        if packet.len() > MAX_PACKET_LENGTH {
            return Err(ProtocolError::OversizedPacket(packet.len()));
        }
        let request = BrokerRequest::SendMessage {
            packet: packet.to_vec(),
            length: packet.len() as u16,
            sending_module,
        };
        match self.call(&request).await? {
            BrokerResponse::Status(s) => Ok(s != 0),
            _ => Err(ProtocolError::UnexpectedResponse),
        }
    }
}
