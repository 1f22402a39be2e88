//! Arbiter Broadcast Hub
//!
//! Fans engine events out to connected real-time subscribers:
//! - One bounded buffer per subscriber; a full buffer disconnects it
//! - Events are serialized once as a `{type, data}` envelope
//! - Subscribers filter by event type with `subscribe` / `unsubscribe`
//!
//! ## Architecture
//!
//! ```text
//!  OrderManager ─┐
//!  Collector ────┼──► BroadcastHub::publish ──► try_send ──► buffer ──► writer ──► wire
//!  Scheduler ────┘          (never blocks)          │                    ▲ ping
//!                                                   └── full: drop ──────┘
//!                                    wire ──► reader ──► subscribe / unsubscribe / ping→pong
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbiter_broadcast::{BroadcastHub, ws};
//!
//! let hub = BroadcastHub::default();
//! let app = ws::router(hub.clone());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod hub;
pub mod memory;
pub mod message;
pub mod session;
pub mod ws;

pub use error::{BroadcastError, Result};
pub use hub::{BroadcastHub, HubConfig, SubscriberId};
pub use memory::{MemoryClient, MemorySink, MemorySource, memory_transport};
pub use message::{ClientMessage, Frame, Inbound};
pub use session::{FrameSink, FrameSource, serve};
