//! Websocket connection context and session driver.
//!
//! DESIGN
//! ======
//! [`run`] drives exactly one connection. A single `tokio::select!` loop owns
//! the [`Session`] and reacts to four event sources: inbound websocket
//! messages, local samples, the throttle deadline, and the outbound queue.
//! Everything happens on one task, so the view model has a single writer and
//! outbound messages leave in throttle-emission order.
//!
//! There is no reconnect. When the transport closes, the throttle is
//! cancelled, the view model cleared, and a final `Closed` render is emitted.
//! Whoever called [`run`] decides whether to start a fresh session.

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;

use std::fmt;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::config::{ClientConfig, ConfigError};
use crate::render::RenderModel;
use crate::sample::LocalSample;
use crate::session::Session;
use crate::state::SelfIdentity;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tungstenite::Error>),
}

/// Websocket lifecycle as shown to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No connection has been attempted yet.
    #[default]
    Uninstantiated,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninstantiated => "Uninstantiated",
            Self::Connecting => "Connecting",
            Self::Open => "Open",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit per-connection context: where we are connected and the
/// non-blocking outbound queue.
#[derive(Debug)]
pub struct Connection {
    url: String,
    outbound: mpsc::UnboundedSender<String>,
}

impl Connection {
    #[must_use]
    pub fn new(url: String) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (Self { url, outbound }, rx)
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Queue a text message for the transport.
    ///
    /// Returns `false` if the connection has already been torn down.
    pub fn send(&self, text: String) -> bool {
        self.outbound.send(text).is_ok()
    }
}

/// Connect, run one presence session until the transport closes or `samples`
/// ends, then tear down.
///
/// `on_render` is called with a fresh [`RenderModel`] after every status
/// change and every accepted snapshot.
///
/// # Errors
///
/// Returns [`ClientError::Config`] for invalid settings and
/// [`ClientError::WsConnect`] if the websocket handshake fails. A disconnect
/// after the handshake is not an error.
pub async fn run<F>(
    config: &ClientConfig,
    identity: SelfIdentity,
    mut samples: mpsc::Receiver<LocalSample>,
    mut on_render: F,
) -> Result<(), ClientError>
where
    F: FnMut(&RenderModel),
{
    config.validate()?;

    let mut session = Session::new(config, identity);
    let (connection, mut outbound_rx) = Connection::new(config.ws_url());

    session.set_status(ConnectionStatus::Connecting);
    on_render(&session.render());

    let stream = match connect_async(connection.url()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            session.on_disconnect();
            on_render(&session.render());
            return Err(ClientError::WsConnect(Box::new(e)));
        }
    };
    tracing::info!(url = %connection.url(), "presence connection open");
    session.set_status(ConnectionStatus::Open);
    on_render(&session.render());

    let (mut sink, mut stream) = stream.split();
    let mut samples_open = true;

    loop {
        let deadline = session.next_deadline();
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if session.on_message(text.as_str()) {
                        on_render(&session.render());
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "server closed presence connection");
                    // Flushes the queued close reply.
                    if let Err(e) = sink.close().await {
                        tracing::debug!(error = %e, "close reply failed");
                    }
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "presence transport failed");
                    break;
                }
                None => break,
            },
            sample = samples.recv(), if samples_open => match sample {
                Some(sample) => session.on_sample(sample, Instant::now()),
                None => {
                    samples_open = false;
                    if let Err(e) = send_final(&mut sink, &mut outbound_rx, &mut session).await {
                        tracing::warn!(error = %e, "presence send failed");
                        break;
                    }
                    session.set_status(ConnectionStatus::Closing);
                    on_render(&session.render());
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        tracing::debug!(error = %e, "close handshake failed");
                        break;
                    }
                }
            },
            () = wait_until(deadline) => {
                if let Some(message) = session.on_tick(Instant::now()) {
                    if !connection.send(message.to_text()) {
                        tracing::debug!("outbound queue closed; dropping position update");
                    }
                }
            },
            Some(text) = outbound_rx.recv() => {
                if let Err(e) = sink.send(Message::text(text)).await {
                    tracing::warn!(error = %e, "presence send failed");
                    break;
                }
            },
        }
    }

    session.on_disconnect();
    tracing::info!(url = %connection.url(), "presence connection closed");
    on_render(&session.render());
    Ok(())
}

/// Send whatever is still queued, then the pending throttled sample, so the
/// last local position reaches the server before the close frame.
async fn send_final<S>(
    sink: &mut S,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
    session: &mut Session,
) -> Result<(), tungstenite::Error>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    while let Ok(text) = outbound_rx.try_recv() {
        sink.send(Message::text(text)).await?;
    }
    if let Some(message) = session.flush() {
        sink.send(Message::text(message.to_text())).await?;
    }
    Ok(())
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
