//! Relay configuration, read once at startup.

use std::time::Duration;

use reqwest::Url;
use tracing::debug;

use crate::debounce::DEFAULT_WINDOW;
use crate::error::ConfigError;
use crate::events::EventKind;

/// Environment variable for the Slack webhook URL.
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
/// Environment variable overriding the destination channel.
pub const ENV_SLACK_CHANNEL: &str = "SLACK_CHANNEL";
/// Environment variable for the sender display name.
pub const ENV_SLACK_USERNAME: &str = "SLACK_USERNAME";
/// Environment variable for the sender icon.
pub const ENV_SLACK_ICON_URL: &str = "SLACK_ICON_URL";
/// Environment variable for the debounce window in milliseconds.
pub const ENV_DEBOUNCE_MS: &str = "OUTAGE_DEBOUNCE_MS";
/// Environment variable for the comma-separated allow-list of event kinds.
pub const ENV_EVENTS: &str = "OUTAGE_EVENTS";
/// Environment variable for the per-service view link template.
pub const ENV_VIEW_URL: &str = "OUTAGE_VIEW_URL";

const DEFAULT_USERNAME: &str = "Outage Notify";
const DEFAULT_VIEW_URL: &str = "http://localhost:3000/services/{id}/view";

/// Placeholder substituted with the service id in view links.
pub const VIEW_URL_ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Slack incoming-webhook URL.
    pub webhook_url: String,
    pub channel: Option<String>,
    pub username: Option<String>,
    pub icon_url: Option<String>,
    /// Quiet period after the last outage/recovery before a flush.
    pub debounce: Duration,
    /// Event kinds that are relayed; everything else is dropped.
    pub events: Vec<EventKind>,
    /// Link template for the View button, with an `{id}` placeholder.
    pub view_url: String,
}

impl RelayConfig {
    /// Configuration with defaults for everything but the destination.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: None,
            username: Some(DEFAULT_USERNAME.to_string()),
            icon_url: None,
            debounce: DEFAULT_WINDOW,
            events: EventKind::ALL.to_vec(),
            view_url: DEFAULT_VIEW_URL.to_string(),
        }
    }

    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: impl IntoIterator<Item = EventKind>) -> Self {
        self.events = events.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_view_url(mut self, view_url: impl Into<String>) -> Self {
        self.view_url = view_url.into();
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the webhook URL is missing or invalid, or
    /// if any optional setting is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`RelayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let webhook_url =
            get(ENV_SLACK_WEBHOOK_URL).ok_or(ConfigError::MissingWebhook(ENV_SLACK_WEBHOOK_URL))?;

        let mut config = Self::new(webhook_url);
        config.channel = get(ENV_SLACK_CHANNEL);
        if let Some(username) = get(ENV_SLACK_USERNAME) {
            config.username = Some(username);
        }
        config.icon_url = get(ENV_SLACK_ICON_URL);

        if let Some(raw) = get(ENV_DEBOUNCE_MS) {
            config.debounce = parse_debounce(&raw)?;
        }
        if let Some(raw) = get(ENV_EVENTS) {
            config.events = parse_events(&raw)?;
        }
        if let Some(view_url) = get(ENV_VIEW_URL) {
            config.view_url = view_url;
        }

        config.validate()?;

        debug!(
            debounce = ?config.debounce,
            events = ?config.events,
            channel = ?config.channel,
            "Loaded relay configuration"
        );

        Ok(config)
    }

    /// Check the settings that cannot be fixed up later.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.webhook_url).map_err(|e| ConfigError::InvalidWebhook {
            url: self.webhook_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidWebhook {
                url: self.webhook_url.clone(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }

        if self.debounce.is_zero() {
            return Err(ConfigError::InvalidDebounce("0".to_string()));
        }

        if !self.view_url.contains(VIEW_URL_ID_PLACEHOLDER) {
            return Err(ConfigError::InvalidViewUrl(self.view_url.clone()));
        }

        Ok(())
    }

    /// Whether events of `kind` are relayed at all.
    #[must_use]
    pub fn is_enabled(&self, kind: EventKind) -> bool {
        self.events.contains(&kind)
    }
}

fn parse_debounce(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(Duration::from_millis(millis)),
        _ => Err(ConfigError::InvalidDebounce(raw.to_string())),
    }
}

/// Parse a comma-separated allow-list. `all` enables every kind.
fn parse_events(raw: &str) -> Result<Vec<EventKind>, ConfigError> {
    if raw.eq_ignore_ascii_case("all") {
        return Ok(EventKind::ALL.to_vec());
    }

    let mut events = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = name.parse::<EventKind>()?;
        if !events.contains(&kind) {
            events.push(kind);
        }
    }

    if events.is_empty() {
        return Err(ConfigError::EmptyEventList(raw.to_string()));
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    const WEBHOOK: &str = "https://hooks.slack.com/services/T000/B000/XXXX";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RelayConfig::from_lookup(lookup(&[(ENV_SLACK_WEBHOOK_URL, WEBHOOK)])).unwrap();

        assert_eq!(config.webhook_url, WEBHOOK);
        assert_eq!(config.debounce, Duration::from_millis(30_000));
        assert_eq!(config.events, EventKind::ALL.to_vec());
        assert_eq!(config.username.as_deref(), Some("Outage Notify"));
        assert_eq!(config.channel, None);
        assert_eq!(config.view_url, "http://localhost:3000/services/{id}/view");
    }

    #[test]
    fn test_overrides() {
        let config = RelayConfig::from_lookup(lookup(&[
            (ENV_SLACK_WEBHOOK_URL, WEBHOOK),
            (ENV_SLACK_CHANNEL, "#ops"),
            (ENV_SLACK_USERNAME, "watchdog"),
            (ENV_SLACK_ICON_URL, "https://example.com/icon.png"),
            (ENV_DEBOUNCE_MS, "5000"),
            (ENV_EVENTS, "new-outage, service-back,new-outage"),
            (ENV_VIEW_URL, "https://status.example.com/s/{id}"),
        ]))
        .unwrap();

        assert_eq!(config.channel.as_deref(), Some("#ops"));
        assert_eq!(config.username.as_deref(), Some("watchdog"));
        assert_eq!(config.icon_url.as_deref(), Some("https://example.com/icon.png"));
        assert_eq!(config.debounce, Duration::from_millis(5000));
        assert_eq!(
            config.events,
            vec![EventKind::NewOutage, EventKind::ServiceBack]
        );
        assert!(config.is_enabled(EventKind::NewOutage));
        assert!(!config.is_enabled(EventKind::LatencyWarning));
        assert_eq!(config.view_url, "https://status.example.com/s/{id}");
    }

    #[test]
    fn test_missing_webhook_is_an_error() {
        let err = RelayConfig::from_lookup(lookup(&[(ENV_SLACK_WEBHOOK_URL, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingWebhook(ENV_SLACK_WEBHOOK_URL)));
    }

    #[test]
    fn test_invalid_webhook_is_an_error() {
        let err =
            RelayConfig::from_lookup(lookup(&[(ENV_SLACK_WEBHOOK_URL, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWebhook { .. }));

        let err = RelayConfig::from_lookup(lookup(&[(ENV_SLACK_WEBHOOK_URL, "ftp://hooks/x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWebhook { .. }));
    }

    #[test]
    fn test_bad_optional_settings_are_errors() {
        for (key, value) in [
            (ENV_DEBOUNCE_MS, "0"),
            (ENV_DEBOUNCE_MS, "soon"),
            (ENV_EVENTS, "new-outage,meltdown"),
            (ENV_VIEW_URL, "https://status.example.com/services"),
        ] {
            let result =
                RelayConfig::from_lookup(lookup(&[(ENV_SLACK_WEBHOOK_URL, WEBHOOK), (key, value)]));
            assert!(result.is_err(), "{key}={value} should be rejected");
        }
    }

    #[test]
    fn test_blank_allow_list_is_an_error() {
        for value in [",", " , ,"] {
            let err = RelayConfig::from_lookup(lookup(&[
                (ENV_SLACK_WEBHOOK_URL, WEBHOOK),
                (ENV_EVENTS, value),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::EmptyEventList(_)),
                "{value:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_all_keyword_enables_every_kind() {
        let config = RelayConfig::from_lookup(lookup(&[
            (ENV_SLACK_WEBHOOK_URL, WEBHOOK),
            (ENV_EVENTS, "ALL"),
        ]))
        .unwrap();
        assert_eq!(config.events.len(), 6);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(ENV_SLACK_WEBHOOK_URL, WEBHOOK);
        std::env::set_var(ENV_DEBOUNCE_MS, "1500");
        let config = RelayConfig::from_env();
        std::env::remove_var(ENV_SLACK_WEBHOOK_URL);
        std::env::remove_var(ENV_DEBOUNCE_MS);

        let config = config.unwrap();
        assert_eq!(config.webhook_url, WEBHOOK);
        assert_eq!(config.debounce, Duration::from_millis(1500));
    }

    #[test]
    #[serial]
    fn test_from_env_without_webhook() {
        std::env::remove_var(ENV_SLACK_WEBHOOK_URL);
        assert!(matches!(
            RelayConfig::from_env(),
            Err(ConfigError::MissingWebhook(_))
        ));
    }
}
