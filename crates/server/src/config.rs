//! Runtime configuration read from the environment.
use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default bind address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8698";
/// Default sender of notification mails.
pub const DEFAULT_MAIL_FROM: &str = inkpost_notify::notifier::DEFAULT_MAIL_FROM;
/// Default recipient of contact form mails.
pub const DEFAULT_CONTACT_TO: &str = "contact@inkpost.local";
/// Default log directive.
pub const DEFAULT_LOG: &str = "info";

/// Error raised while loading [`Config`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("environment variable `{0}` is required")]
    Missing(&'static str),
    /// A variable holds a value that cannot be parsed.
    #[error("environment variable `{name}` has invalid value `{value}`")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Server configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub listen: String,
    /// HS256 secret shared with the token issuer.
    pub jwt_secret: String,
    /// Sender of notification mails.
    pub mail_from: String,
    /// Recipient of contact form mails.
    pub contact_to: String,
    /// Period of the new-blog sweep. Zero disables it.
    pub sweep_interval: Duration,
    /// How far back the sweep looks for published posts.
    pub sweep_window: Duration,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen", &self.listen)
            .field("jwt_secret", &"***")
            .field("mail_from", &self.mail_from)
            .field("contact_to", &self.contact_to)
            .field("sweep_interval", &self.sweep_interval)
            .field("sweep_window", &self.sweep_window)
            .field("log", &self.log)
            .finish()
    }
}

impl Config {
    /// Create a config with defaults and the given JWT secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            listen: DEFAULT_LISTEN.into(),
            jwt_secret: jwt_secret.into(),
            mail_from: DEFAULT_MAIL_FROM.into(),
            contact_to: DEFAULT_CONTACT_TO.into(),
            sweep_interval: Duration::from_secs(3600),
            sweep_window: Duration::from_secs(3600),
            log: DEFAULT_LOG.into(),
        }
    }

    /// Load the config from the process environment.
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the config through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("INKPOST_JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("INKPOST_JWT_SECRET"))?;
        let mut config = Self::new(secret);
        if let Some(listen) = lookup("INKPOST_LISTEN") {
            config.listen = listen;
        }
        if let Some(from) = lookup("INKPOST_MAIL_FROM") {
            config.mail_from = from;
        }
        if let Some(to) = lookup("INKPOST_CONTACT_TO") {
            config.contact_to = to;
        }
        if let Some(value) = lookup("INKPOST_SWEEP_INTERVAL_SECS") {
            config.sweep_interval = parse_secs("INKPOST_SWEEP_INTERVAL_SECS", value)?;
        }
        if let Some(value) = lookup("INKPOST_SWEEP_WINDOW_SECS") {
            config.sweep_window = parse_secs("INKPOST_SWEEP_WINDOW_SECS", value)?;
        }
        if let Some(log) = lookup("RUST_LOG") {
            config.log = log;
        }
        Ok(config)
    }

    /// Sets the bind address and returns `Self`.
    #[must_use]
    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = listen.into();
        self
    }

    /// Sets the notification sender and returns `Self`.
    #[must_use]
    pub fn with_mail_from(mut self, from: impl Into<String>) -> Self {
        self.mail_from = from.into();
        self
    }

    /// Sets the contact form recipient and returns `Self`.
    #[must_use]
    pub fn with_contact_to(mut self, to: impl Into<String>) -> Self {
        self.contact_to = to.into();
        self
    }

    /// Sets the sweep period and returns `Self`.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the sweep window and returns `Self`.
    #[must_use]
    pub fn with_sweep_window(mut self, window: Duration) -> Self {
        self.sweep_window = window;
        self
    }
}

fn parse_secs(name: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(ConfigError::Invalid { name, value }),
    }
}
