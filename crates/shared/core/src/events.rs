//! Events published by the engine to real-time subscribers
//!
//! Serialized as a `{"type": ..., "data": ...}` envelope.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::Order;
use crate::values::{ItemId, VenueId};

/// A new price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub item: ItemId,
    pub price: Decimal,
    pub venue: VenueId,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderUpdateKind {
    Created,
    Completed,
    Failed,
    Cancelled,
}

/// An order changed state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub kind: OrderUpdateKind,
    pub order: Order,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Free-form message for operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Everything the engine broadcasts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EngineEvent {
    PriceUpdate(PriceUpdate),
    OrderUpdate(OrderUpdate),
    Notification(Notification),
    /// Reply to a subscriber ping, carrying unix seconds
    Pong(i64),
}

impl EngineEvent {
    /// Wire name of the event, used for topic filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::PriceUpdate(_) => "price_update",
            EngineEvent::OrderUpdate(_) => "order_update",
            EngineEvent::Notification(_) => "notification",
            EngineEvent::Pong(_) => "pong",
        }
    }

    pub fn order(kind: OrderUpdateKind, order: Order) -> Self {
        EngineEvent::OrderUpdate(OrderUpdate { kind, order })
    }
}
