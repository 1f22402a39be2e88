//! Websocket route
//!
//! `GET /ws` upgrades the connection and hands both halves to a session.

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};

use crate::error::{BroadcastError, Result};
use crate::hub::BroadcastHub;
use crate::message::{Frame, Inbound};
use crate::session::{FrameSink, FrameSource, serve};

/// Router exposing the hub at `/ws`
pub fn router(hub: BroadcastHub) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(hub)
}

/// Handle WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<BroadcastHub>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: BroadcastHub) {
    let (sender, receiver) = socket.split();
    serve(hub, WsSink(sender), WsSource(receiver)).await;
}

struct WsSink(SplitSink<WebSocket, Message>);

struct WsSource(SplitStream<WebSocket>);

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, frame: Frame) -> Result<()> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text.to_string().into()),
            Frame::Ping => Message::Ping(Default::default()),
        };
        self.0
            .send(message)
            .await
            .map_err(|e| BroadcastError::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.0.send(Message::Close(None)).await;
    }
}

#[async_trait]
impl FrameSource for WsSource {
    async fn next(&mut self) -> Option<Result<Inbound>> {
        let message = self.0.next().await?;
        Some(
            message
                .map(|m| match m {
                    Message::Text(text) => Inbound::Text(text.as_str().to_owned()),
                    Message::Binary(_) => Inbound::Binary,
                    Message::Ping(_) => Inbound::Ping,
                    Message::Pong(_) => Inbound::Pong,
                    Message::Close(_) => Inbound::Close,
                })
                .map_err(|e| BroadcastError::Transport(e.to_string())),
        )
    }
}
