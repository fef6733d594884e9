//! utm-core: UTM attribution persisted in a browser cookie
//!
//! This crate holds the framework-independent engine:
//!
//! - **Record** - [`AttributionRecord`] over the five canonical [`UtmKey`]s
//! - **Engine** - [`AttributionStore`], the lazy per-request merge of the stored
//!   cookie with freshly observed query parameters
//! - **Wire format** - [`codec`] for the cookie payload and [`SetCookie`] for
//!   outbound instructions
//! - **Hooks** - [`RequestLifecycle`] for auto-initialization on main requests
//!
//! # Quick Start
//!
//! ```
//! use utm_core::{AttributionStore, RequestSnapshot};
//!
//! let request = RequestSnapshot::from_parts(
//!     Some("utm=%7B%22utm_source%22%3A%22newsletter%22%7D"),
//!     Some("utm_medium=email"),
//! );
//! let mut store = AttributionStore::new(request);
//! store.set_overwrite(false);
//!
//! assert_eq!(store.get_value("source").unwrap(), Some("newsletter"));
//! assert_eq!(store.get_value("utm_medium").unwrap(), Some("email"));
//!
//! // New query values arrived, so the cookie is rewritten
//! assert_eq!(store.take_cookies().len(), 1);
//! ```

pub mod codec;
pub mod config;
pub mod cookie;
pub mod error;
pub mod lifecycle;
pub mod record;
pub mod request;
pub mod sanitize;
pub mod store;

pub use config::UtmConfig;
pub use cookie::SetCookie;
pub use error::{UtmError, UtmResult};
pub use lifecycle::{AutoInitHook, RequestHook, RequestKind, RequestLifecycle};
pub use record::{AttributionRecord, UtmKey};
pub use request::{RequestSnapshot, RequestSource};
pub use sanitize::{HtmlEntitySanitizer, Sanitizer};
pub use store::AttributionStore;
