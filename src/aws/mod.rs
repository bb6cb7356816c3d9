//! AWS request plumbing shared by the notification and dictation clients.
//!
//! - [`credentials`] - Access keys read from the environment
//! - [`sigv4`] - Signature Version 4 header signing and URL presigning

pub mod credentials;
pub mod sigv4;

pub use credentials::AwsCredentials;
pub use sigv4::SigV4Signer;

/// Regional endpoint host for `service`, e.g. `sns.us-east-1.amazonaws.com`
pub fn regional_host(service: &str, region: &str) -> String {
    format!("{}.{}.amazonaws.com", service, region)
}
