//! Request middleware

mod attribution;

pub use attribution::{Attribution, SubRequest, UtmLayer, utm_middleware};
