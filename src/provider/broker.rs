use std::time::Duration;

use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::Mutex, time};
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::intake,
    model::User,
    types::{AckFrame, ReplyFrame},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound half of the broker contract: consume a delivery tag exactly
/// once, and answer request/response patterns. Mocked in intake tests.
#[allow(async_fn_in_trait)]
pub trait Acknowledge: Sync {
    async fn ack(&self, tag: u64) -> Result<(), Error>;
    async fn reply(&self, tag: u64, user: &User) -> Result<(), Error>;
}

pub struct WsGateway {
    write: Mutex<SplitSink<WsStream, Message>>,
}

impl Acknowledge for WsGateway {
    async fn ack(&self, tag: u64) -> Result<(), Error> {
        let frame = serde_json::to_string(&AckFrame { ack: tag })?;
        self.write.lock().await.send(Message::Text(frame)).await?;
        Ok(())
    }

    async fn reply(&self, tag: u64, user: &User) -> Result<(), Error> {
        let frame = serde_json::to_string(&ReplyFrame { reply_to: tag, user })?;
        self.write.lock().await.send(Message::Text(frame)).await?;
        Ok(())
    }
}

/// Broker connection manager. Reconnects forever; a dropped connection
/// leaves any un-acked messages to the broker's own redelivery policy.
#[derive(Debug)]
pub struct Broker {
    app_state: AppState<State>,
}

impl Broker {
    pub fn new(app_state: AppState<State>) -> Self {
        Self { app_state }
    }

    pub async fn run(&mut self) -> Result<(), Error> {
        let reconnect =
            Duration::from_secs(self.app_state.config.socket_reconnect_interval);

        loop {
            if let Err(e) = self.connect().await {
                tracing::error!(
                    "broker disconnected with error: {}, reconnecting",
                    e
                );
            }
            time::sleep(reconnect).await;
        }
    }

    async fn connect(&mut self) -> Result<(), Error> {
        let url = self.app_state.config.broker_url.to_owned();
        let (socket, _response) = connect_async(url.as_str()).await?;
        tracing::info!("broker connected");

        let (write, mut read) = socket.split();
        let gateway = WsGateway {
            write: Mutex::new(write),
        };

        while let Some(message) = read.next().await {
            match message? {
                Message::Text(text) => {
                    // A failure before the ack leaves the message to broker
                    // redelivery; after the ack it is final. Either way the
                    // connection stays up.
                    if let Err(e) =
                        intake::handle_message(&self.app_state, &gateway, &text)
                            .await
                    {
                        tracing::error!(
                            error = %e,
                            "broker message handling failed; if unacknowledged it will be redelivered"
                        );
                    }
                },
                Message::Close(_) => break,
                Message::Binary(_)
                | Message::Ping(_)
                | Message::Pong(_)
                | Message::Frame(_) => {},
            }
        }

        Ok(())
    }
}
