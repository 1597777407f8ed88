use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::prelude::*;
use rd_core::metrics;
use rd_core::settings::{GateCredentials, SettingsHandle};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

const CHALLENGE: &str = r#"Basic realm="AI Receptionist Dashboard""#;
const REJECTION_BODY: &str = "Authentication required";

const EXEMPT_PREFIXES: &[&str] = &["/_next/", "/assets/"];
const EXEMPT_PATHS: &[&str] = &["/favicon.ico", "/robots.txt", "/sitemap.xml", "/healthz"];

/// Static assets and probe endpoints. Everything else needs credentials.
pub fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path) || EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotConfigured,
    MissingHeader,
    WrongScheme,
    Malformed,
    Mismatch,
}

impl Denial {
    pub fn as_str(self) -> &'static str {
        match self {
            Denial::NotConfigured => "not_configured",
            Denial::MissingHeader => "missing_header",
            Denial::WrongScheme => "wrong_scheme",
            Denial::Malformed => "malformed",
            Denial::Mismatch => "mismatch",
        }
    }
}

/// Checks an `Authorization` header against the configured pair. Unconfigured
/// credentials reject everything.
pub fn authorize(
    credentials: &GateCredentials,
    header: Option<&HeaderValue>,
) -> Result<(), Denial> {
    if !credentials.is_configured() {
        return Err(Denial::NotConfigured);
    }

    let header = header.ok_or(Denial::MissingHeader)?;
    let header = header.to_str().map_err(|_| Denial::Malformed)?;
    let encoded = header.strip_prefix("Basic ").ok_or(Denial::WrongScheme)?;
    let decoded = BASE64_STANDARD
        .decode(encoded)
        .map_err(|_| Denial::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| Denial::Malformed)?;
    let (username, password) = decoded.split_once(':').ok_or(Denial::Malformed)?;

    if username == credentials.username && password == credentials.password {
        Ok(())
    } else {
        Err(Denial::Mismatch)
    }
}

pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [
            (WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE)),
            (
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
        ],
        REJECTION_BODY,
    )
        .into_response()
}

/// Runs [`authorize`] before the wrapped service. Credentials are read from
/// the settings handle on every request.
#[derive(Clone)]
pub struct AccessGateLayer {
    settings: SettingsHandle,
    service_name: &'static str,
}

impl AccessGateLayer {
    pub fn new(settings: SettingsHandle, service_name: &'static str) -> Self {
        Self {
            settings,
            service_name,
        }
    }
}

impl<S> Layer<S> for AccessGateLayer {
    type Service = AccessGate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessGate {
            inner,
            settings: self.settings.clone(),
            service_name: self.service_name,
        }
    }
}

#[derive(Clone)]
pub struct AccessGate<S> {
    inner: S,
    settings: SettingsHandle,
    service_name: &'static str,
}

impl<S, ReqBody> Service<Request<ReqBody>> for AccessGate<S>
where
    S: Service<Request<ReqBody>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        // Swap in the clone so the instance that was polled ready handles this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let settings = self.settings.clone();
        let service_name = self.service_name;

        Box::pin(async move {
            if is_exempt(request.uri().path()) {
                return inner.call(request).await;
            }

            let snapshot = settings.get().await;
            match authorize(&snapshot.credentials, request.headers().get(AUTHORIZATION)) {
                Ok(()) => {
                    metrics::inc_auth_success(service_name);
                    inner.call(request).await
                }
                Err(denial) => {
                    tracing::debug!(
                        path = %request.uri().path(),
                        reason = denial.as_str(),
                        "access gate rejected request"
                    );
                    metrics::inc_auth_failure(service_name, denial.as_str());
                    Ok(unauthorized())
                }
            }
        })
    }
}
