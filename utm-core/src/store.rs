//! The attribution engine: lazy per-request merge of cookie and query values

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::codec;
use crate::config::{DEFAULT_COOKIE_NAME, DEFAULT_LIFETIME_SECS, UtmConfig};
use crate::cookie::SetCookie;
use crate::error::{UtmError, UtmResult};
use crate::record::{AttributionRecord, UtmKey};
use crate::request::RequestSource;
use crate::sanitize::{HtmlEntitySanitizer, Sanitizer};

/// Request-scoped view of a visitor's UTM attribution
///
/// The record is built on first access by [`AttributionStore::init`] and
/// cached for the rest of the request. Cookie writes are queued and handed to
/// the hosting layer through [`AttributionStore::take_cookies`].
///
/// One store serves one request. Sharing a store between concurrent requests
/// would leak the first request's cached record into the others.
pub struct AttributionStore {
    name: String,
    lifetime: i64,
    path: String,
    domain: String,
    overwrite: bool,
    secure: bool,
    http_only: bool,
    record: Option<AttributionRecord>,
    sanitizer: Arc<dyn Sanitizer>,
    request: Box<dyn RequestSource + Send + Sync>,
    pending: Vec<SetCookie>,
}

impl AttributionStore {
    /// Store with default settings and HTML-entity sanitization
    pub fn new(request: impl RequestSource + Send + Sync + 'static) -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            lifetime: DEFAULT_LIFETIME_SECS,
            path: "/".to_string(),
            domain: String::new(),
            overwrite: true,
            secure: false,
            http_only: false,
            record: None,
            sanitizer: Arc::new(HtmlEntitySanitizer),
            request: Box::new(request),
            pending: Vec::new(),
        }
    }

    /// Store configured from `config` through the regular setters, so the
    /// same validation applies as for manual configuration.
    pub fn from_config(
        config: &UtmConfig,
        sanitizer: Arc<dyn Sanitizer>,
        request: impl RequestSource + Send + Sync + 'static,
    ) -> UtmResult<Self> {
        let mut store = Self::new(request).with_sanitizer(sanitizer);
        store.set_name(&config.name)?;
        store.set_lifetime(config.lifetime)?;
        store.set_path(&config.path);
        store.set_domain(&config.domain);
        store.set_overwrite(config.overwrite);
        store.set_secure(config.secure);
        store.set_http_only(config.httponly);
        Ok(store)
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Set the cookie name. Drops any cached record.
    pub fn set_name(&mut self, name: &str) -> UtmResult<()> {
        if name.trim().is_empty() {
            return Err(UtmError::InvalidConfiguration(format!(
                "cookie name \"{name}\" can't be empty"
            )));
        }
        self.name = name.to_string();
        self.record = None;
        Ok(())
    }

    /// Set the cookie lifetime in seconds. Applies to the next cookie write.
    pub fn set_lifetime(&mut self, seconds: i64) -> UtmResult<()> {
        if seconds <= 0 {
            return Err(UtmError::InvalidConfiguration(format!(
                "lifetime must be positive, got {seconds}"
            )));
        }
        self.lifetime = seconds;
        Ok(())
    }

    /// Set the overwrite policy. Drops any cached record.
    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
        self.record = None;
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    pub fn set_domain(&mut self, domain: &str) {
        self.domain = domain.to_string();
    }

    pub fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    pub fn set_http_only(&mut self, http_only: bool) {
        self.http_only = http_only;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> i64 {
        self.lifetime
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Whether a record is cached for this request
    pub fn is_initialized(&self) -> bool {
        self.record.is_some()
    }

    /// Build and cache the record. No-op when one is already cached.
    pub fn init(&mut self) {
        self.get();
    }

    /// The full five-key record, initializing first if needed
    pub fn get(&mut self) -> &AttributionRecord {
        let record = match self.record.take() {
            Some(record) => record,
            None => self.initialize(),
        };
        self.record.insert(record)
    }

    /// A single value. `key` may omit the `utm_` prefix.
    pub fn get_value(&mut self, key: &str) -> UtmResult<Option<&str>> {
        self.init();
        let key = UtmKey::parse(key)?;
        Ok(self.get().get(key))
    }

    /// Tell the client to drop the attribution cookie.
    ///
    /// The cached record is left untouched: reads later in this request still
    /// see the values from before the clear.
    pub fn clear(&mut self) {
        tracing::debug!(cookie = %self.name, "expiring attribution cookie");
        let cookie = self.decorate(SetCookie::expire(&self.name));
        self.pending.push(cookie);
    }

    /// Cookie instructions queued so far
    pub fn pending_cookies(&self) -> &[SetCookie] {
        &self.pending
    }

    /// Drain the queued cookie instructions for the outbound response
    pub fn take_cookies(&mut self) -> Vec<SetCookie> {
        std::mem::take(&mut self.pending)
    }

    fn initialize(&mut self) -> AttributionRecord {
        let from_cookie: AttributionRecord = self
            .request
            .cookie(&self.name)
            .map(|raw| codec::decode(&raw))
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, self.sanitizer.sanitize(&value)))
            .collect();

        let from_query: AttributionRecord = UtmKey::ALL
            .into_iter()
            .filter_map(|key| {
                self.request
                    .query_param(key.as_str())
                    .map(|value| (key, self.sanitizer.sanitize(&value)))
            })
            .collect();

        let mut record = AttributionRecord::new();
        if !from_query.is_empty() && self.overwrite {
            record.overlay(&from_query);
        } else {
            record.overlay(&from_cookie);
            record.overlay(&from_query);
        }

        if !from_query.is_empty() {
            self.persist(&record);
        }

        record
    }

    fn persist(&mut self, record: &AttributionRecord) {
        let value = codec::encode(record);
        tracing::debug!(cookie = %self.name, value = %value, "persisting attribution cookie");
        let cookie = self.decorate(SetCookie::persist(
            &self.name,
            value,
            Utc::now(),
            self.lifetime,
        ));
        self.pending.push(cookie);
    }

    fn decorate(&self, cookie: SetCookie) -> SetCookie {
        cookie
            .with_path(&self.path)
            .with_domain(&self.domain)
            .with_secure(self.secure)
            .with_http_only(self.http_only)
    }
}

impl fmt::Debug for AttributionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributionStore")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("path", &self.path)
            .field("domain", &self.domain)
            .field("overwrite", &self.overwrite)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("record", &self.record)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
