//! In-process transport
//!
//! Connects a session to a [`MemoryClient`] over unbounded channels, for
//! embedding without a socket.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{BroadcastError, Result};
use crate::message::{Frame, Inbound};
use crate::session::{FrameSink, FrameSource};

pub struct MemorySink {
    tx: mpsc::UnboundedSender<Frame>,
}

pub struct MemorySource {
    rx: mpsc::UnboundedReceiver<Inbound>,
}

/// The peer end: push inbound frames, read what the session wrote
pub struct MemoryClient {
    pub outgoing: mpsc::UnboundedSender<Inbound>,
    pub incoming: mpsc::UnboundedReceiver<Frame>,
}

impl MemoryClient {
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.outgoing.send(Inbound::Text(text.into())).is_ok()
    }
}

pub fn memory_transport() -> (MemorySink, MemorySource, MemoryClient) {
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    (
        MemorySink { tx: frames_tx },
        MemorySource { rx: inbound_rx },
        MemoryClient {
            outgoing: inbound_tx,
            incoming: frames_rx,
        },
    )
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send(&mut self, frame: Frame) -> Result<()> {
        self.tx.send(frame).map_err(|_| BroadcastError::Closed)
    }
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn next(&mut self) -> Option<Result<Inbound>> {
        self.rx.recv().await.map(Ok)
    }
}
