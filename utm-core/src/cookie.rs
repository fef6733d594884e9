//! Outbound cookie instructions

use chrono::{DateTime, Duration, Utc};

/// IMF-fixdate, the `Expires` attribute format
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A `Set-Cookie` instruction queued for the outbound response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    /// Raw value, percent-encoded when rendered
    pub value: String,
    pub expires: DateTime<Utc>,
    pub max_age: i64,
    pub path: String,
    /// Empty means the current host; the attribute is then omitted
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
}

impl SetCookie {
    /// Cookie carrying `value` that lives for `lifetime` seconds from `now`
    pub fn persist(
        name: impl Into<String>,
        value: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: i64,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: Duration::try_seconds(lifetime)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            max_age: lifetime,
            path: "/".to_string(),
            domain: String::new(),
            secure: false,
            http_only: false,
        }
    }

    /// Empty cookie that the client drops immediately
    pub fn expire(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            expires: DateTime::from_timestamp(0, 0).unwrap_or_default(),
            max_age: 0,
            path: "/".to_string(),
            domain: String::new(),
            secure: false,
            http_only: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// True when the client should discard the cookie on receipt
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Expires={}; Max-Age={}",
            self.name,
            urlencoding::encode(&self.value),
            self.expires.format(EXPIRES_FORMAT),
            self.max_age
        );
        if !self.path.is_empty() {
            header.push_str("; Path=");
            header.push_str(&self.path);
        }
        if !self.domain.is_empty() {
            header.push_str("; Domain=");
            header.push_str(&self.domain);
        }
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_persist_header() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let cookie = SetCookie::persist("utm", r#"{"utm_source":"google"}"#, now, 60);

        assert_eq!(
            cookie.to_header_value(),
            "utm=%7B%22utm_source%22%3A%22google%22%7D; Expires=Fri, 01 Mar 2024 12:01:00 GMT; Max-Age=60; Path=/"
        );
    }

    #[test]
    fn test_header_flags_and_domain() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let header = SetCookie::persist("utm", "{}", now, 60)
            .with_path("/shop")
            .with_domain("example.com")
            .with_secure(true)
            .with_http_only(true)
            .to_header_value();

        assert!(header.ends_with("; Path=/shop; Domain=example.com; Secure; HttpOnly"));
    }

    #[test]
    fn test_expire_is_in_the_past() {
        let cookie = SetCookie::expire("utm");
        assert!(cookie.value.is_empty());
        assert!(cookie.is_expired_at(Utc::now()));
        assert_eq!(
            cookie.to_header_value(),
            "utm=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/"
        );
    }
}
