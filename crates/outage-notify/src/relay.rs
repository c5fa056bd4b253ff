//! The relay session: routing, reconciliation and flushing.
//!
//! A [`Relay`] owns the reconciliation store, the debounce timer and the
//! delivery channel handle. One task drives it ([`Relay::run`]), so every
//! event, store mutation and flush happens in sequence without locks.
//!
//! ```text
//!  MonitorEvent ──▶ route() ──┬─ filtered ──▶ (dropped)
//!                             ├─ new-outage / service-back ──▶ store + debouncer.trigger()
//!                             └─ other kinds ──▶ compose_immediate() ──▶ dispatch
//!
//!  debouncer.fired() ──▶ flush() ──▶ drain ──▶ compose ×2 ──▶ dispatch (independent)
//! ```
//!
//! Dispatch is fire-and-forget: each message is sent from its own spawned
//! task and the outcome is only logged. `route` and `flush` return before
//! delivery completes; only shutdown waits for sends still in flight.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::channels::DeliveryChannel;
use crate::compose::Composer;
use crate::config::RelayConfig;
use crate::debounce::Debouncer;
use crate::events::{EventKind, MonitorEvent};
use crate::message::SlackMessage;
use crate::store::OutageStore;

/// What [`Relay::route`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Kind is not in the allow-list; nothing happened.
    Filtered,
    /// Recorded in the store; the flush timer was re-armed.
    Reconciled,
    /// Sent straight to the delivery channel.
    Sent,
}

/// A reconciliation session. Create one per process.
pub struct Relay {
    config: RelayConfig,
    store: OutageStore,
    debouncer: Debouncer,
    composer: Composer,
    channel: Arc<dyn DeliveryChannel>,
    in_flight: TaskTracker,
}

impl Relay {
    #[must_use]
    pub fn new(config: &RelayConfig, channel: Arc<dyn DeliveryChannel>) -> Self {
        Self {
            config: config.clone(),
            store: OutageStore::new(),
            debouncer: Debouncer::new(config.debounce),
            composer: Composer::from_config(config),
            channel,
            in_flight: TaskTracker::new(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &OutageStore {
        &self.store
    }

    #[must_use]
    pub const fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Handle one event from the monitoring engine.
    ///
    /// Must be called from within a Tokio runtime: immediate sends are
    /// spawned onto it.
    pub fn route(&mut self, event: MonitorEvent) -> RouteOutcome {
        let MonitorEvent {
            event: kind,
            service,
            data,
        } = event;

        if !self.config.is_enabled(kind) {
            debug!(event = %kind, service = %service.id, "Event kind not enabled, ignoring");
            return RouteOutcome::Filtered;
        }

        match kind {
            EventKind::NewOutage => {
                info!(event = %kind, service = %service.id, name = %service.name, "Outage recorded");
                self.store.record_outage(service, data);
                self.debouncer.trigger();
                RouteOutcome::Reconciled
            }
            EventKind::ServiceBack => {
                info!(event = %kind, service = %service.id, name = %service.name, "Recovery recorded");
                self.store.record_recovery(service, data);
                self.debouncer.trigger();
                RouteOutcome::Reconciled
            }
            EventKind::LatencyWarning
            | EventKind::CurrentOutage
            | EventKind::ServiceError
            | EventKind::ServiceOk => {
                let message = self
                    .composer
                    .compose_immediate(kind, &service, &data, Utc::now());
                info!(event = %kind, service = %service.id, "Relaying event immediately");
                self.dispatch(kind, message);
                RouteOutcome::Sent
            }
        }
    }

    /// Drain the store and compose the flush messages without sending them.
    ///
    /// Yields at most two messages: new outages first, then recoveries.
    pub fn take_flush(&mut self, now: DateTime<Utc>) -> Vec<(EventKind, SlackMessage)> {
        let drained = self.store.drain();
        let ongoing = drained.outages.len();

        [
            (EventKind::NewOutage, &drained.outages),
            (EventKind::ServiceBack, &drained.recoveries),
        ]
        .into_iter()
        .filter_map(|(kind, entries)| {
            self.composer
                .compose(kind, entries, ongoing, now)
                .map(|message| (kind, message))
        })
        .collect()
    }

    /// Flush now: drain the store and dispatch one message per non-empty
    /// side. Disarms any pending flush. Returns the number of messages
    /// dispatched.
    pub fn flush(&mut self) -> usize {
        self.debouncer.cancel();

        let messages = self.take_flush(Utc::now());
        if messages.is_empty() {
            debug!("Flush found nothing to report");
            return 0;
        }

        let count = messages.len();
        for (kind, message) in messages {
            info!(
                event = %kind,
                blocks = message.attachments.iter().map(|a| a.blocks.len()).sum::<usize>(),
                "Dispatching summary"
            );
            self.dispatch(kind, message);
        }
        count
    }

    /// Drive the session until `events` closes.
    ///
    /// A flush that is still pending when the queue closes runs immediately,
    /// and the session waits for in-flight sends before returning.
    pub async fn run(mut self, mut events: mpsc::Receiver<MonitorEvent>) {
        info!(
            channel = self.channel.name(),
            debounce = ?self.debouncer.window(),
            enabled = ?self.config.events,
            "Relay session started"
        );

        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Some(event) => {
                        self.route(event);
                    }
                    None => break,
                },
                () = self.debouncer.fired() => {
                    self.flush();
                }
            }
        }

        if !self.store.is_empty() {
            info!("Event queue closed, flushing pending notifications");
            self.flush();
        }

        self.in_flight.close();
        if !self.in_flight.is_empty() {
            debug!(pending = self.in_flight.len(), "Waiting for in-flight sends");
        }
        self.in_flight.wait().await;
        info!("Relay session stopped");
    }

    /// Run the session on its own task.
    ///
    /// Returns the sender the monitoring engine feeds and the session's
    /// join handle. Dropping every sender stops the session.
    #[must_use]
    pub fn spawn(self, queue_depth: usize) -> (mpsc::Sender<MonitorEvent>, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let handle = tokio::spawn(self.run(receiver));
        (sender, handle)
    }

    fn dispatch(&self, kind: EventKind, message: SlackMessage) {
        let channel = Arc::clone(&self.channel);

        self.in_flight.spawn(async move {
            let channel_name = channel.name();

            match channel.send(&message).await {
                Ok(()) => {
                    debug!(channel = channel_name, event = %kind, "Notification sent");
                }
                Err(e) => {
                    error!(
                        channel = channel_name,
                        event = %kind,
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        });
    }
}
