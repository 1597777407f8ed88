use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time;

use crate::config;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";

const BACKEND_URL_ENVS: &[&str] = &["BACKEND_URL", "NEXT_PUBLIC_BACKEND_URL"];
const USER_ENV: &str = "DASH_USER";
const PASS_ENV: &str = "DASH_PASS";

/// The single shared username/password pair guarding the dashboard.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GateCredentials {
    pub username: String,
    pub password: String,
}

impl GateCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both halves must be non-empty, otherwise the gate stays closed.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for GateCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub backend_url: String,
    pub credentials: GateCredentials,
}

impl DashboardSettings {
    pub fn new(backend_url: &str, credentials: GateCredentials) -> Self {
        Self {
            backend_url: normalize_backend_url(Some(backend_url)),
            credentials,
        }
    }

    pub fn from_env() -> Self {
        let backend_url = config::first_env(BACKEND_URL_ENVS);
        Self {
            backend_url: normalize_backend_url(backend_url.as_deref()),
            credentials: GateCredentials::new(
                config::env_or_empty(USER_ENV),
                config::env_or_empty(PASS_ENV),
            ),
        }
    }
}

/// Trims the configured base URL and strips trailing slashes; blank means the local default.
pub fn normalize_backend_url(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return DEFAULT_BACKEND_URL.to_string();
    }
    trimmed.trim_end_matches('/').to_string()
}

#[derive(Clone)]
pub struct SettingsHandle {
    state: Arc<RwLock<DashboardSettings>>,
}

impl SettingsHandle {
    pub async fn get(&self) -> DashboardSettings {
        self.state.read().await.clone()
    }

    pub async fn replace(&self, settings: DashboardSettings) -> bool {
        let mut guard = self.state.write().await;
        if *guard == settings {
            return false;
        }
        *guard = settings;
        true
    }
}

pub fn static_handle(settings: DashboardSettings) -> SettingsHandle {
    SettingsHandle {
        state: Arc::new(RwLock::new(settings)),
    }
}

/// Reads the environment now and, when `poll_interval` is non-zero, keeps
/// re-reading it so credential rotations apply without a restart.
pub fn watch_env(poll_interval: Duration) -> SettingsHandle {
    let handle = static_handle(DashboardSettings::from_env());
    if poll_interval.is_zero() {
        return handle;
    }

    let watched = handle.clone();
    tokio::spawn(async move {
        loop {
            time::sleep(poll_interval).await;
            let next = DashboardSettings::from_env();
            let gate_open = next.credentials.is_configured();
            let backend_url = next.backend_url.clone();
            if watched.replace(next).await {
                tracing::info!(
                    backend_url = %backend_url,
                    gate_configured = gate_open,
                    "dashboard settings reloaded"
                );
            }
        }
    });

    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{env_lock, set_env};
    use std::env;

    #[test]
    fn normalize_backend_url_defaults_when_blank() {
        assert_eq!(normalize_backend_url(None), DEFAULT_BACKEND_URL);
        assert_eq!(normalize_backend_url(Some("  ")), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn normalize_backend_url_trims_whitespace_and_slashes() {
        assert_eq!(
            normalize_backend_url(Some(" http://calls:3001/ ")),
            "http://calls:3001"
        );
    }

    #[test]
    fn credentials_need_both_halves() {
        assert!(GateCredentials::new("ops", "secret").is_configured());
        assert!(!GateCredentials::new("", "secret").is_configured());
        assert!(!GateCredentials::new("ops", "").is_configured());
        assert!(!GateCredentials::default().is_configured());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let rendered = format!("{:?}", GateCredentials::new("ops", "hunter2"));
        assert!(rendered.contains("ops"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn from_env_prefers_backend_url_and_reads_credentials() {
        let _lock = env_lock();
        let _backend = set_env("BACKEND_URL", "http://calls-backend:4000/");
        let _public = set_env("NEXT_PUBLIC_BACKEND_URL", "http://ignored:1");
        let _user = set_env("DASH_USER", "ops");
        let _pass = set_env("DASH_PASS", "s3cret");

        let settings = DashboardSettings::from_env();
        assert_eq!(settings.backend_url, "http://calls-backend:4000");
        assert_eq!(settings.credentials, GateCredentials::new("ops", "s3cret"));
    }

    #[test]
    fn from_env_without_values_is_closed_and_local() {
        let _lock = env_lock();
        for key in ["BACKEND_URL", "NEXT_PUBLIC_BACKEND_URL", "DASH_USER", "DASH_PASS"] {
            env::remove_var(key);
        }

        let settings = DashboardSettings::from_env();
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        assert!(!settings.credentials.is_configured());
    }

    #[tokio::test]
    async fn replace_reports_whether_snapshot_changed() {
        let handle = static_handle(DashboardSettings::new(
            "http://a",
            GateCredentials::new("ops", "one"),
        ));
        let same = DashboardSettings::new("http://a", GateCredentials::new("ops", "one"));
        assert!(!handle.replace(same).await);

        let rotated = DashboardSettings::new("http://a", GateCredentials::new("ops", "two"));
        assert!(handle.replace(rotated.clone()).await);
        assert_eq!(handle.get().await, rotated);
    }
}
