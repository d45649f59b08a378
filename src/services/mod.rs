// src/services/mod.rs
//
// Identity provider integration: the trait the HTTP surface depends on and
// the Firebase implementation behind it.

pub mod firebase;
pub mod firebase_keys;
pub mod identity;
pub mod service_account;

#[cfg(test)]
pub mod stub;

// Re-export commonly used types for convenience
pub use firebase::FirebaseClient;
pub use identity::{IdentityProvider, ProviderError, ProviderUser};
pub use service_account::ServiceAccount;
