//! Per-connection session
//!
//! Each connection runs two loops:
//! - Writer: drains the subscriber buffer to the wire, pings every
//!   `keepalive_interval`
//! - Reader: handles `subscribe` / `unsubscribe` / `ping`; silence longer
//!   than `keepalive_timeout` ends the session
//!
//! The session ends when either loop ends. The subscriber is removed from
//! the hub on the way out.

use std::sync::Arc;
use std::time::Duration;

use arbiter_core::EngineEvent;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{BroadcastError, Result};
use crate::hub::{BroadcastHub, SubscriberId};
use crate::message::{ClientMessage, Frame, Inbound};

/// Outbound half of a connection
#[async_trait]
pub trait FrameSink: Send {
    async fn send(&mut self, frame: Frame) -> Result<()>;

    async fn close(&mut self) {}
}

/// Inbound half of a connection
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, or `None` once the peer is gone
    async fn next(&mut self) -> Option<Result<Inbound>>;
}

/// Drive one subscriber connection until it ends
pub async fn serve<S, R>(hub: BroadcastHub, sink: S, mut source: R)
where
    S: FrameSink + 'static,
    R: FrameSource,
{
    let (id, rx) = hub.register();
    let keepalive = hub.config().keepalive_interval;
    let timeout = hub.config().keepalive_timeout;

    let mut writer = tokio::spawn(write_loop(id, sink, rx, keepalive));

    let writer_done = tokio::select! {
        _ = read_loop(&hub, id, &mut source, timeout) => false,
        _ = &mut writer => true,
    };

    hub.remove(id);
    if !writer_done && let Err(e) = writer.await {
        warn!("[session {}] writer ended abnormally: {}", id, e);
    }
    debug!("[session {}] closed", id);
}

async fn write_loop<S: FrameSink>(
    id: SubscriberId,
    mut sink: S,
    mut rx: mpsc::Receiver<Arc<str>>,
    keepalive: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + keepalive, keepalive);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let frame = tokio::select! {
            next = rx.recv() => match next {
                Some(text) => Frame::Text(text),
                // removed from the hub
                None => break,
            },
            _ = ticker.tick() => Frame::Ping,
        };
        if let Err(e) = sink.send(frame).await {
            debug!("[session {}] write failed: {}", id, e);
            break;
        }
    }
    sink.close().await;
}

async fn read_loop<R: FrameSource>(
    hub: &BroadcastHub,
    id: SubscriberId,
    source: &mut R,
    timeout: Duration,
) {
    loop {
        let inbound = match tokio::time::timeout(timeout, source.next()).await {
            Err(_) => {
                info!("[session {}] no frame within {:?}, disconnecting", id, timeout);
                return;
            }
            Ok(None) | Ok(Some(Ok(Inbound::Close))) => return,
            Ok(Some(Err(e))) => {
                debug!("[session {}] read failed: {}", id, e);
                return;
            }
            Ok(Some(Ok(inbound))) => inbound,
        };

        // any frame counts as a keepalive acknowledgement
        let Inbound::Text(text) = inbound else {
            continue;
        };
        match ClientMessage::parse(&text) {
            Ok(ClientMessage::Subscribe(topics)) => hub.subscribe(id, topics),
            Ok(ClientMessage::Unsubscribe(topics)) => hub.unsubscribe(id, &topics),
            Ok(ClientMessage::Ping) => {
                match hub.send_to(id, &EngineEvent::Pong(Utc::now().timestamp())) {
                    Ok(true) => {}
                    Ok(false) => return,
                    Err(e) => warn!("[session {}] pong failed: {}", id, e),
                }
            }
            Err(BroadcastError::Malformed(reason)) => {
                debug!("[session {}] ignoring message: {}", id, reason)
            }
            Err(e) => warn!("[session {}] {}", id, e),
        }
    }
}
