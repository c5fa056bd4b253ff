//! Outage notifications for service-monitoring events.
//!
//! This crate relays events from a service monitor (outages, recoveries,
//! latency warnings, check errors) to a Slack channel. Outages and
//! recoveries are not sent one by one: they are reconciled over a debounce
//! window and flushed as one summary per kind, so a storm of failures turns
//! into a single message and a service that flaps down and back inside the
//! window is never reported at all.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use outage_notify::{EventData, EventKind, MonitorEvent, Relay, RelayConfig, Service, SlackChannel};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RelayConfig::from_env()?;
//! let channel = Arc::new(SlackChannel::new(config.webhook_url.clone()));
//! let (events, session) = Relay::new(&config, channel).spawn(64);
//!
//! events
//!     .send(MonitorEvent::new(
//!         EventKind::NewOutage,
//!         Service::new("1", "API", "https://api.example.com"),
//!         EventData::at(chrono::Utc::now()),
//!     ))
//!     .await?;
//!
//! drop(events);
//! session.await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`RelayConfig::from_env`] reads:
//!
//! - `SLACK_WEBHOOK_URL`: Slack incoming-webhook URL (required)
//! - `SLACK_CHANNEL`, `SLACK_USERNAME`, `SLACK_ICON_URL`: sender overrides
//! - `OUTAGE_DEBOUNCE_MS`: debounce window, default 30000
//! - `OUTAGE_EVENTS`: comma-separated event kinds to relay, default all
//! - `OUTAGE_VIEW_URL`: View button link with an `{id}` placeholder
//!
//! # Architecture
//!
//! - [`Relay`] owns one reconciliation session and routes each event
//! - [`OutageStore`] holds net outage/recovery state between flushes
//! - [`Debouncer`] is the single pending-flush timer
//! - [`Composer`] renders Slack Block Kit messages
//! - [`DeliveryChannel`] is the outbound seam; [`SlackChannel`] implements it

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod compose;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod humanize;
pub mod message;
pub mod relay;
pub mod server;
pub mod store;

pub use channels::slack::SlackChannel;
pub use channels::DeliveryChannel;
pub use compose::Composer;
pub use config::RelayConfig;
pub use debounce::{debounce, Debounced, Debouncer};
pub use error::{ChannelError, ConfigError};
pub use events::{EventData, EventKind, MonitorEvent, Service, Severity};
pub use message::SlackMessage;
pub use relay::{Relay, RouteOutcome};
pub use store::{Drained, Entry, OutageStore};
