//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod decision;
mod email;
mod exemption;
mod identity;
mod rate_key;
mod window;

pub use decision::Decision;
pub use email::EmailAddress;
pub use exemption::{DEFAULT_EXEMPT_EXTENSIONS, DEFAULT_EXEMPT_PREFIXES, PathExemptions};
pub use identity::ClientIdentity;
pub use rate_key::{KeyNamespace, RateKey};
pub use window::WindowPolicy;
