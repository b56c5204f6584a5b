//! A client's connection to the server, over either transport.
//!
//! [`ClientConnection::split`] hands out independent send and receive
//! halves so a console can keep typing while a listener task prints what
//! arrives.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parley_protocol::{Codec, JsonCodec, Message, ProtocolError, ServerMessage};
use parley_transport::MAX_LINE_LENGTH;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Sending half.
pub struct ClientSender {
    inner: SenderInner,
    codec: JsonCodec,
}

enum SenderInner {
    Tcp(FramedWrite<OwnedWriteHalf, LinesCodec>),
    Ws(SplitSink<WsStream, WsMessage>),
}

/// Receiving half.
pub struct ClientReceiver {
    inner: ReceiverInner,
    codec: JsonCodec,
}

enum ReceiverInner {
    Tcp(FramedRead<OwnedReadHalf, LinesCodec>),
    Ws(SplitStream<WsStream>),
}

/// A connected client.
pub struct ClientConnection {
    sender: ClientSender,
    receiver: ClientReceiver,
}

impl ClientConnection {
    /// Connects to a line-delimited TCP server at `addr` (`host:port`).
    pub async fn connect_tcp(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(ClientError::Connect)?;
        let (read, write) = stream.into_split();
        tracing::debug!(addr, "connected over TCP");
        Ok(Self::from_parts(
            SenderInner::Tcp(FramedWrite::new(write, LinesCodec::new())),
            ReceiverInner::Tcp(FramedRead::new(
                read,
                LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            )),
        ))
    }

    /// Connects to a WebSocket server. `addr` may be a full `ws://` URL or
    /// a bare `host:port`.
    pub async fn connect_ws(addr: &str) -> Result<Self, ClientError> {
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("ws://{addr}")
        };
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (sink, stream) = ws.split();
        tracing::debug!(%url, "connected over WebSocket");
        Ok(Self::from_parts(SenderInner::Ws(sink), ReceiverInner::Ws(stream)))
    }

    fn from_parts(sender: SenderInner, receiver: ReceiverInner) -> Self {
        Self {
            sender: ClientSender {
                inner: sender,
                codec: JsonCodec,
            },
            receiver: ClientReceiver {
                inner: receiver,
                codec: JsonCodec,
            },
        }
    }

    pub async fn send(&mut self, message: &Message) -> Result<(), ClientError> {
        self.sender.send(message).await
    }

    pub async fn recv(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        self.receiver.recv().await
    }

    /// Separates the two directions.
    pub fn split(self) -> (ClientSender, ClientReceiver) {
        (self.sender, self.receiver)
    }
}

impl ClientSender {
    /// Encodes and sends one request.
    pub async fn send(&mut self, message: &Message) -> Result<(), ClientError> {
        let bytes = self.codec.encode(message)?;
        match &mut self.inner {
            SenderInner::Tcp(writer) => {
                let line = String::from_utf8(bytes).map_err(|_| {
                    ProtocolError::InvalidMessage("encoded frame is not UTF-8".into())
                })?;
                writer.send(line).await?;
            }
            SenderInner::Ws(sink) => sink.send(WsMessage::binary(bytes)).await?,
        }
        Ok(())
    }

    /// Closes the sending direction.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        match &mut self.inner {
            SenderInner::Tcp(writer) => SinkExt::<String>::close(writer).await?,
            SenderInner::Ws(sink) => sink.close().await?,
        }
        Ok(())
    }
}

impl ClientReceiver {
    /// Waits for the next server frame. `Ok(None)` once the server has
    /// closed the connection.
    pub async fn recv(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        loop {
            let data = match &mut self.inner {
                ReceiverInner::Tcp(reader) => match reader.next().await {
                    Some(line) => line?.into_bytes(),
                    None => return Ok(None),
                },
                ReceiverInner::Ws(stream) => match stream.next().await {
                    Some(Ok(WsMessage::Binary(data))) => data.to_vec(),
                    Some(Ok(WsMessage::Text(text))) => text.as_bytes().to_vec(),
                    Some(Ok(WsMessage::Close(_))) | None => return Ok(None),
                    // Ping/pong are answered by tungstenite.
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                },
            };
            if data.is_empty() {
                continue;
            }
            return Ok(Some(self.codec.decode(&data)?));
        }
    }
}
