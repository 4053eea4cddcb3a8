//! WebSocket transport to the planner.
//!
//! The socket is split on open. A reader task owns the receive half and
//! forwards every text frame into an unbounded queue; the tick loop drains
//! that queue once per frame, so network I/O never blocks the simulation.

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::error::RunnerError;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Something the reader task observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A text frame from the planner.
    Text(String),
    /// The connection ended, with the reason if one is known.
    Closed(Option<String>),
}

/// An open connection to the planner.
#[derive(Debug)]
pub struct Connection {
    outbound: SplitSink<Socket, Message>,
    inbound: mpsc::UnboundedReceiver<Event>,
    reader: JoinHandle<()>,
}

impl Connection {
    /// Connect to `url` and start the reader task.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Transport`] if the handshake fails.
    pub async fn open(url: &str) -> Result<Self, RunnerError> {
        let (socket, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| RunnerError::Transport(format!("failed to connect to {url}: {e}")))?;
        info!(url, "planner connection established");

        let (outbound, mut stream) = socket.split();
        let (tx, inbound) = mpsc::unbounded_channel();
        let reader = tokio::spawn(async move {
            let reason = loop {
                match stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(Event::Text(text.as_str().to_owned())).is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        break frame.map(|f| f.reason.as_str().to_owned());
                    }
                    Some(Ok(other)) => {
                        debug!(kind = ?other, "ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "planner read error");
                        break Some(e.to_string());
                    }
                    None => break None,
                }
            };
            let _ = tx.send(Event::Closed(reason));
        });

        Ok(Self {
            outbound,
            inbound,
            reader,
        })
    }

    /// Send one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Transport`] if the socket rejects the frame.
    pub async fn send(&mut self, text: String) -> Result<(), RunnerError> {
        self.outbound
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| RunnerError::Transport(format!("failed to send frame: {e}")))
    }

    /// Everything received since the last drain, oldest first.
    ///
    /// A reader task that vanished without a close event is reported as
    /// closed.
    pub fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            match self.inbound.try_recv() {
                Ok(event) => events.push(event),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    if !matches!(events.last(), Some(Event::Closed(_))) {
                        events.push(Event::Closed(None));
                    }
                    break;
                }
            }
        }
        events
    }

    /// Send a close frame and stop the reader.
    pub async fn close(mut self) {
        if let Err(e) = self.outbound.close().await {
            debug!(error = %e, "close frame not sent");
        }
        self.reader.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::time::Duration;

    use tokio::net::TcpListener;

    use super::*;

    async fn local_listener() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    async fn drain_until_closed(connection: &mut Connection) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..300 {
            events.extend(connection.drain());
            if matches!(events.last(), Some(Event::Closed(_))) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        events
    }

    #[tokio::test]
    async fn frames_flow_both_ways_and_close_is_queued() {
        let (listener, url) = local_listener().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
            socket
                .send(Message::Text(r#"{"plan": []}"#.into()))
                .await
                .unwrap();
            let received = socket.next().await.unwrap().unwrap();
            socket.close(None).await.unwrap();
            received.into_text().unwrap().as_str().to_owned()
        });

        let mut connection = Connection::open(&url).await.unwrap();
        connection.send("hello".to_owned()).await.unwrap();
        let events = drain_until_closed(&mut connection).await;
        assert_eq!(
            events.first(),
            Some(&Event::Text(r#"{"plan": []}"#.to_owned()))
        );
        assert!(matches!(events.last(), Some(Event::Closed(_))), "{events:?}");
        assert_eq!(server.await.unwrap(), "hello");
        connection.close().await;
    }

    #[tokio::test]
    async fn peer_vanishing_is_reported_as_closed() {
        let (listener, url) = local_listener().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let socket = tokio_tungstenite::accept_async(stream).await.unwrap();
            drop(socket);
        });

        let mut connection = Connection::open(&url).await.unwrap();
        server.await.unwrap();
        let events = drain_until_closed(&mut connection).await;
        assert!(matches!(events.last(), Some(Event::Closed(_))), "{events:?}");
        assert!(connection.drain().iter().all(|e| matches!(e, Event::Closed(_))));
    }

    #[tokio::test]
    async fn refused_handshake_is_a_transport_error() {
        let (listener, url) = local_listener().await;
        drop(listener);
        let err = Connection::open(&url).await.unwrap_err();
        assert!(
            matches!(err, RunnerError::Transport(ref m) if m.contains("failed to connect")),
            "{err}"
        );
    }
}
