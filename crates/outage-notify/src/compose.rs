//! Builds Slack messages from events and flushed store entries.

use chrono::{DateTime, Utc};

use crate::config::{RelayConfig, VIEW_URL_ID_PLACEHOLDER};
use crate::events::{EventData, EventKind, Service};
use crate::humanize;
use crate::message::{Attachment, Block, SlackMessage};
use crate::store::Entry;

/// Marker placed in front of every service line.
const SERVER_ICON: &str = ":computer:";

/// Label of the per-service link button.
const VIEW_BUTTON: &str = "View";

/// Renders relay messages with the configured sender defaults.
#[derive(Debug, Clone)]
pub struct Composer {
    view_url: String,
    channel: Option<String>,
    username: Option<String>,
    icon_url: Option<String>,
}

impl Composer {
    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            view_url: config.view_url.clone(),
            channel: config.channel.clone(),
            username: config.username.clone(),
            icon_url: config.icon_url.clone(),
        }
    }

    /// Link to the service's detail page.
    #[must_use]
    pub fn view_url(&self, service: &Service) -> String {
        self.view_url.replace(VIEW_URL_ID_PLACEHOLDER, &service.id)
    }

    /// Summary message for one side of a flush.
    ///
    /// Returns `None` when there is nothing to report. `ongoing_outages` is
    /// the number of services still down at flush time; it is only mentioned
    /// on `service-back` summaries.
    #[must_use]
    pub fn compose(
        &self,
        kind: EventKind,
        entries: &[Entry],
        ongoing_outages: usize,
        now: DateTime<Utc>,
    ) -> Option<SlackMessage> {
        if entries.is_empty() {
            return None;
        }

        let mut blocks = Vec::with_capacity(entries.len() + 2);
        blocks.push(Block::markdown(format!("*{}*", kind.label())));

        for entry in entries {
            let mut text = service_line(&entry.service);
            if let Some(detail) = detail(kind, &entry.data, now) {
                text.push('\n');
                text.push_str(&detail);
            }
            blocks.push(Block::markdown_with_button(
                text,
                VIEW_BUTTON,
                self.view_url(&entry.service),
            ));
        }

        if kind == EventKind::ServiceBack && ongoing_outages > 0 {
            blocks.push(Block::context(ongoing_summary(ongoing_outages)));
        }

        Some(self.message(kind, kind.label().to_string(), blocks))
    }

    /// Single-line message for an event that bypasses reconciliation.
    #[must_use]
    pub fn compose_immediate(
        &self,
        kind: EventKind,
        service: &Service,
        data: &EventData,
        now: DateTime<Utc>,
    ) -> SlackMessage {
        let mut line = format!("*{}* {}", kind.label(), service_line(service));
        if let Some(detail) = detail(kind, data, now) {
            line.push_str(" · ");
            line.push_str(&detail);
        }

        let block = Block::markdown_with_button(line.clone(), VIEW_BUTTON, self.view_url(service));
        self.message(kind, line, vec![block])
    }

    fn message(&self, kind: EventKind, text: String, blocks: Vec<Block>) -> SlackMessage {
        SlackMessage {
            text,
            channel: self.channel.clone(),
            username: self.username.clone(),
            icon_url: self.icon_url.clone(),
            attachments: vec![Attachment {
                color: kind.severity().color().to_string(),
                blocks,
            }],
        }
    }
}

/// "Currently there is still 1 outage." / "... are still N outages."
#[must_use]
pub fn ongoing_summary(count: usize) -> String {
    if count == 1 {
        "Currently there is still 1 outage.".to_string()
    } else {
        format!("Currently there are still {count} outages.")
    }
}

fn service_line(service: &Service) -> String {
    let name = escape(&service.name);
    if service.url.is_empty() {
        format!("{SERVER_ICON} *{name}*")
    } else {
        format!("{SERVER_ICON} *<{}|{name}>*", escape(&service.url))
    }
}

/// Kind-specific detail text. `None` when the payload lacks what it needs.
fn detail(kind: EventKind, data: &EventData, now: DateTime<Utc>) -> Option<String> {
    match kind {
        EventKind::NewOutage | EventKind::CurrentOutage => data
            .timestamp()
            .map(|since| format!("Went down {}", humanize::relative(since, now))),
        EventKind::ServiceBack => data
            .timestamp()
            .map(|since| format!("Down for {}", humanize::duration(now - since))),
        EventKind::LatencyWarning | EventKind::ServiceOk => data
            .elapsed_ms()
            .map(|elapsed| format!("Responded in {elapsed} ms")),
        EventKind::ServiceError => data.error().map(|error| format!("Error: {}", escape(error))),
    }
}

/// Escape the characters Slack treats as control sequences in mrkdwn.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
