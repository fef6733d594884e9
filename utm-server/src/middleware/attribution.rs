//! Attribution middleware for axum

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::Request,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::Response,
};
use utm_core::{
    AttributionRecord, AttributionStore, HtmlEntitySanitizer, RequestKind, RequestLifecycle,
    RequestSnapshot, Sanitizer, SetCookie, UtmConfig, UtmKey, UtmResult,
};

/// Marks a request as internal so lifecycle hooks treat it as a sub-request
#[derive(Debug, Clone, Copy)]
pub struct SubRequest;

/// Middleware state shared by every request
#[derive(Clone)]
pub struct UtmLayer {
    config: Arc<UtmConfig>,
    sanitizer: Arc<dyn Sanitizer>,
    lifecycle: RequestLifecycle,
}

impl UtmLayer {
    /// Create a layer for `config`, rejecting settings the engine would refuse
    pub fn new(config: UtmConfig) -> UtmResult<Self> {
        Self::with_sanitizer(config, Arc::new(HtmlEntitySanitizer))
    }

    /// Create a layer with a custom sanitizer
    pub fn with_sanitizer(config: UtmConfig, sanitizer: Arc<dyn Sanitizer>) -> UtmResult<Self> {
        config.validate()?;
        // Run the setters once so a zero lifetime fails here instead of per request
        AttributionStore::from_config(&config, Arc::clone(&sanitizer), RequestSnapshot::new())?;

        let lifecycle = RequestLifecycle::from_config(&config);
        Ok(Self {
            config: Arc::new(config),
            sanitizer,
            lifecycle,
        })
    }

    /// Replace the hooks run for each request
    pub fn with_lifecycle(mut self, lifecycle: RequestLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn config(&self) -> &UtmConfig {
        &self.config
    }

    /// Fresh store for one request
    fn store_for(&self, request: RequestSnapshot) -> UtmResult<AttributionStore> {
        AttributionStore::from_config(&self.config, Arc::clone(&self.sanitizer), request)
    }
}

/// Handle to the current request's attribution, available as a request extension
#[derive(Clone)]
pub struct Attribution {
    store: Arc<Mutex<AttributionStore>>,
}

impl Attribution {
    fn new(store: AttributionStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AttributionStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The full five-key record
    pub fn record(&self) -> AttributionRecord {
        self.lock().get().clone()
    }

    /// A single value, `key` may omit the `utm_` prefix
    pub fn value(&self, key: &str) -> UtmResult<Option<String>> {
        Ok(self.lock().get_value(key)?.map(str::to_string))
    }

    /// Value of an already resolved key
    pub fn value_of(&self, key: UtmKey) -> Option<String> {
        self.lock().get().get(key).map(str::to_string)
    }

    /// Expire the attribution cookie on the client
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_initialized()
    }

    fn take_cookies(&self) -> Vec<SetCookie> {
        self.lock().take_cookies()
    }
}

/// Join every `Cookie` header, HTTP/2 clients may send several
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn snapshot(request: &Request) -> RequestSnapshot {
    RequestSnapshot::from_parts(
        cookie_header(request.headers()).as_deref(),
        request.uri().query(),
    )
}

/// Attribution middleware function
///
/// Builds a store for the request, runs the lifecycle hooks, exposes the
/// store as an [`Attribution`] extension and appends queued cookies to the
/// response.
pub async fn utm_middleware(
    axum::Extension(layer): axum::Extension<UtmLayer>,
    mut request: Request,
    next: Next,
) -> Response {
    let kind = if request.extensions().get::<SubRequest>().is_some() {
        RequestKind::Sub
    } else {
        RequestKind::Main
    };

    let mut store = match layer.store_for(snapshot(&request)) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("Attribution disabled for request: {}", e);
            return next.run(request).await;
        }
    };

    if let Err(e) = layer.lifecycle.dispatch(kind, &mut store) {
        tracing::warn!("Attribution hook failed: {}", e);
    }

    let attribution = Attribution::new(store);
    request.extensions_mut().insert(attribution.clone());

    let mut response = next.run(request).await;

    for cookie in attribution.take_cookies() {
        match HeaderValue::from_str(&cookie.to_header_value()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => {
                tracing::warn!("Dropping unrepresentable cookie {}: {}", cookie.name, e);
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, routing::get};
    use tower::ServiceExt;

    fn app(config: UtmConfig) -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(attribution): Extension<Attribution>| async move {
                    attribution.value("source").unwrap().unwrap_or_default()
                }),
            )
            .layer(axum::middleware::from_fn(utm_middleware))
            .layer(Extension(UtmLayer::new(config).unwrap()))
    }

    #[test]
    fn test_layer_rejects_zero_lifetime() {
        let config = UtmConfig {
            lifetime: 0,
            ..Default::default()
        };
        assert!(UtmLayer::new(config).is_err());
    }

    #[test]
    fn test_layer_rejects_blank_name() {
        let config = UtmConfig {
            name: " ".to_string(),
            ..Default::default()
        };
        assert!(UtmLayer::new(config).is_err());
    }

    #[test]
    fn test_cookie_header_joins_multiple() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("utm=x"));
        assert_eq!(cookie_header(&headers).as_deref(), Some("a=1; utm=x"));
        assert!(cookie_header(&HeaderMap::new()).is_none());
    }

    #[tokio::test]
    async fn test_sub_request_is_not_initialized() {
        let router = Router::new()
            .route(
                "/",
                get(|Extension(attribution): Extension<Attribution>| async move {
                    attribution.is_initialized().to_string()
                }),
            )
            .layer(axum::middleware::from_fn(utm_middleware))
            .layer(Extension(UtmLayer::new(UtmConfig::default()).unwrap()));

        let mut request = axum::http::Request::builder()
            .uri("/?utm_source=google")
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(SubRequest);

        let response = router.oneshot(request).await.unwrap();
        assert!(response.headers().get(SET_COOKIE).is_none());

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"false");
    }

    #[tokio::test]
    async fn test_main_request_sets_cookie() {
        let request = axum::http::Request::builder()
            .uri("/?utm_source=google")
            .body(Body::empty())
            .unwrap();

        let response = app(UtmConfig::default()).oneshot(request).await.unwrap();
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("utm=%7B%22utm_source%22%3A%22google%22%7D;"));

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"google");
    }

    #[test]
    fn test_value_of_reads_resolved_key() {
        let request = RequestSnapshot::from_parts(None, Some("utm_medium=cpc&utm_term=shoes"));
        let layer = UtmLayer::new(UtmConfig::default()).unwrap();
        let attribution = Attribution::new(layer.store_for(request).unwrap());

        assert_eq!(attribution.value_of(UtmKey::Medium).as_deref(), Some("cpc"));
        assert_eq!(attribution.value_of(UtmKey::Source), None);
        assert_eq!(
            attribution.value_of(UtmKey::Term),
            attribution.value("term").unwrap()
        );
        assert!(attribution.is_initialized());
    }
}
