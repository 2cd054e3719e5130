#![warn(clippy::all)]
//! BCE v1 (`bce-auth-v1`) request signing.
//!
//! This produces the `Authorization` header value expected by BCE services (BOS and friends):
//!
//! ```text
//! bce-auth-v1/{accessKeyId}/{timestamp}/{expirationSeconds}/{signedHeaders}/{signature}
//! ```
//!
//! # Example
//! ```
//! use scratchstack_bce_signature::{sign, Credentials, SignRequest};
//!
//! let credentials = Credentials::new("AK", "SK");
//! let request = SignRequest::builder()
//!     .method("GET")
//!     .canonical_uri("/v1/object")
//!     .timestamp("2015-04-27T08:23:49Z")
//!     .build()
//!     .unwrap();
//!
//! let token = sign(&credentials, &request).unwrap();
//! assert_eq!(
//!     token,
//!     "bce-auth-v1/AK/2015-04-27T08:23:49Z/1800//e9db84c62df123ae7320ac91277dd755c3c68cea1e190b02f73c1b5584881bf3"
//! );
//! ```
//!
//! The library logs through the [`log`](https://docs.rs/log) facade and never installs a logger.

pub mod canonical;
mod chronoutil;
mod constants;
mod credentials;
mod crypto;
mod digest;
mod endpoint;
mod error;
mod signature;
mod signing_key;
mod validation;

pub use {
    canonical::{append_uri, canonicalize_headers, canonicalize_query, get_header_ignore_case, normalize_string},
    chronoutil::{format_canonical_time, is_canonical_time, parse_canonical_time, Clock, FixedClock, SystemClock, Timestamp},
    constants::{DEFAULT_CHUNK_SIZE, DEFAULT_EXPIRATION_SECONDS},
    credentials::{ClientConfig, ClientConfigBuilder, Credentials, Protocol},
    digest::{content_md5, content_md5_bytes, content_md5_to_end},
    endpoint::parse_endpoint,
    error::SignatureError,
    signature::{insert_authorization, sign, SignRequest, SignRequestBuilder, SignatureEngine},
    signing_key::{SigningKey, SigningKeyInfo},
    validation::{is_ip_host, is_valid_bucket_name},
};

#[cfg(test)]
mod unittest;
