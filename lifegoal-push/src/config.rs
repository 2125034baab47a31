use std::net::SocketAddr;
use std::path::PathBuf;
use std::{env, fmt};
use thiserror::Error;

const DEFAULT_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_SUBSCRIPTIONS_FILE: &str = "push-subscriptions.jsonl";

/// Push service configuration sourced from the environment.
#[derive(Clone)]
pub struct PushConfig {
    pub addr: SocketAddr,
    pub secret: String,
    pub vapid_public_key: Option<String>,
    pub dev_routes: bool,
    pub subscriptions_file: PathBuf,
}

impl fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushConfig")
            .field("addr", &self.addr)
            .field("secret", &"<redacted>")
            .field("vapid_public_key", &self.vapid_public_key)
            .field("dev_routes", &self.dev_routes)
            .field("subscriptions_file", &self.subscriptions_file)
            .finish()
    }
}

impl PushConfig {
    /// # Errors
    ///
    /// Fails when `LIFEGOAL_PUSH_SECRET` is missing or `LIFEGOAL_PUSH_ADDR`
    /// is not a socket address.
    pub fn from_env() -> Result<Self, PushConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable lookup; blank values count as unset.
    ///
    /// # Errors
    ///
    /// See [`PushConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PushConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let secret = var("LIFEGOAL_PUSH_SECRET").ok_or(PushConfigError::MissingSecret)?;

        let raw_addr = var("LIFEGOAL_PUSH_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|_| PushConfigError::InvalidAddr(raw_addr.clone()))?;

        let dev_routes = var("LIFEGOAL_DEV_ROUTES").is_some_and(|value| {
            matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
        });

        let subscriptions_file = var("LIFEGOAL_SUBSCRIPTIONS_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SUBSCRIPTIONS_FILE), PathBuf::from);

        Ok(Self {
            addr,
            secret,
            vapid_public_key: var("VAPID_PUBLIC_KEY"),
            dev_routes,
            subscriptions_file,
        })
    }
}

#[derive(Debug, Error)]
pub enum PushConfigError {
    #[error("LIFEGOAL_PUSH_SECRET is not set")]
    MissingSecret,
    #[error("LIFEGOAL_PUSH_ADDR is not a socket address: {0}")]
    InvalidAddr(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| vars.get(name).map(|value| (*value).to_string())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = PushConfig::from_lookup(lookup(&[("LIFEGOAL_PUSH_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.addr, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert!(!cfg.dev_routes);
        assert_eq!(cfg.vapid_public_key, None);
        assert_eq!(cfg.subscriptions_file, PathBuf::from(DEFAULT_SUBSCRIPTIONS_FILE));
    }

    #[test]
    fn missing_or_blank_secret_is_rejected() {
        assert!(matches!(
            PushConfig::from_lookup(lookup(&[])),
            Err(PushConfigError::MissingSecret)
        ));
        assert!(matches!(
            PushConfig::from_lookup(lookup(&[("LIFEGOAL_PUSH_SECRET", "   ")])),
            Err(PushConfigError::MissingSecret)
        ));
    }

    #[test]
    fn reads_every_variable() {
        let cfg = PushConfig::from_lookup(lookup(&[
            ("LIFEGOAL_PUSH_SECRET", "s3cret"),
            ("LIFEGOAL_PUSH_ADDR", "0.0.0.0:9000"),
            ("LIFEGOAL_DEV_ROUTES", "1"),
            ("VAPID_PUBLIC_KEY", " BPub "),
            ("LIFEGOAL_SUBSCRIPTIONS_FILE", "/tmp/subs.jsonl"),
        ]))
        .unwrap();
        assert_eq!(cfg.addr.port(), 9000);
        assert!(cfg.dev_routes);
        assert_eq!(cfg.vapid_public_key.as_deref(), Some("BPub"));
        assert_eq!(cfg.subscriptions_file, PathBuf::from("/tmp/subs.jsonl"));
        assert!(!format!("{cfg:?}").contains("s3cret"));
    }

    #[test]
    fn bad_addr_is_reported() {
        let err = PushConfig::from_lookup(lookup(&[
            ("LIFEGOAL_PUSH_SECRET", "s3cret"),
            ("LIFEGOAL_PUSH_ADDR", "nowhere"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn errors_work_with_anyhow_context() {
        let err = anyhow::Error::new(PushConfigError::MissingSecret).context("loading config");
        assert_eq!(err.root_cause().to_string(), "LIFEGOAL_PUSH_SECRET is not set");
        assert_eq!(
            PushConfigError::InvalidAddr("x:y".to_string()).to_string(),
            "LIFEGOAL_PUSH_ADDR is not a socket address: x:y"
        );
    }
}
