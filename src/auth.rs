//! OAuth2 client-credentials support: redacted secrets, credential pairs, and the
//! per-carrier token cache.

pub mod cache;
pub mod credentials;
pub mod secret;

pub use cache::*;
pub use credentials::*;
pub use secret::*;
