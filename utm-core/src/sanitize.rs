//! Sanitization of untrusted cookie and query values

/// Transforms an untrusted string before it is stored in the record
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, raw: &str) -> String;
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn sanitize(&self, raw: &str) -> String {
        self(raw)
    }
}

/// HTML special-character encoding, quotes included
///
/// Already-encoded entities are encoded again, so `&amp;` becomes `&amp;amp;`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEntitySanitizer;

impl Sanitizer for HtmlEntitySanitizer {
    fn sanitize(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#039;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(c),
            }
        }
        out
    }
}
