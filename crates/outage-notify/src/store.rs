//! Outage reconciliation store.
//!
//! Holds the net outage/recovery state accumulated since the last flush.
//! A service id lives in at most one of the two sets: recording an outage
//! withdraws a pending recovery for the same service and vice versa, so a
//! service that flaps down and back inside one window is never reported.

use crate::events::{EventData, Service};

/// A `{service, data}` pair held until the next flush.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub service: Service,
    pub data: EventData,
}

/// Everything accumulated since the previous flush, in first-seen order.
#[derive(Debug, Default, PartialEq)]
pub struct Drained {
    pub outages: Vec<Entry>,
    pub recoveries: Vec<Entry>,
}

impl Drained {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outages.is_empty() && self.recoveries.is_empty()
    }
}

/// Outstanding outages and recoveries keyed by service id.
///
/// Both sets keep insertion order. They stay small (one entry per service
/// that changed state inside a debounce window), so lookups are linear.
#[derive(Debug, Default)]
pub struct OutageStore {
    outages: Vec<Entry>,
    recoveries: Vec<Entry>,
}

impl OutageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `service` went down.
    ///
    /// The first outage seen for a service wins; repeats keep the original
    /// data. Any pending recovery for the service is withdrawn.
    pub fn record_outage(&mut self, service: Service, data: EventData) {
        withdraw(&mut self.recoveries, &service.id);
        insert_if_absent(&mut self.outages, service, data);
    }

    /// Record that `service` came back.
    ///
    /// A recovery for a service whose outage is still pending cancels that
    /// outage and is itself dropped: neither was ever reported. Otherwise the
    /// first recovery seen is kept.
    pub fn record_recovery(&mut self, service: Service, data: EventData) {
        if !withdraw(&mut self.outages, &service.id) {
            insert_if_absent(&mut self.recoveries, service, data);
        }
    }

    /// Take both sets, leaving the store empty.
    pub fn drain(&mut self) -> Drained {
        Drained {
            outages: std::mem::take(&mut self.outages),
            recoveries: std::mem::take(&mut self.recoveries),
        }
    }

    #[must_use]
    pub fn outages(&self) -> &[Entry] {
        &self.outages
    }

    #[must_use]
    pub fn recoveries(&self) -> &[Entry] {
        &self.recoveries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outages.is_empty() && self.recoveries.is_empty()
    }
}

/// Remove `id` from `entries`, reporting whether it was present.
fn withdraw(entries: &mut Vec<Entry>, id: &str) -> bool {
    let before = entries.len();
    entries.retain(|entry| entry.service.id != id);
    entries.len() != before
}

fn insert_if_absent(entries: &mut Vec<Entry>, service: Service, data: EventData) {
    if !entries.iter().any(|entry| entry.service.id == service.id) {
        entries.push(Entry { service, data });
    }
}
