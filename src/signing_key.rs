use {
    crate::{
        constants::{BCE_AUTH_VERSION, SHA256_HEX_LENGTH},
        crypto::hmac_sha256_hex,
        Credentials,
    },
    std::fmt::{Debug, Display, Formatter, Result as FmtResult},
};

/// The signing key info: `bce-auth-v1/{accessKeyId}/{timestamp}/{expirationSeconds}`.
///
/// This is both the HMAC input used to derive the [SigningKey] and the first four segments of the
/// authorization token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SigningKeyInfo {
    /// The access key id.
    access_key_id: String,

    /// The timestamp in `YYYY-MM-DDTHH:MM:SSZ` form.
    canonical_timestamp: String,

    /// How long the signature remains valid, in seconds.
    expiration_seconds: i64,
}

impl SigningKeyInfo {
    /// Create a new `SigningKeyInfo`. The timestamp must already be in canonical form.
    pub fn new<A, T>(access_key_id: A, canonical_timestamp: T, expiration_seconds: i64) -> Self
    where
        A: Into<String>,
        T: Into<String>,
    {
        Self {
            access_key_id: access_key_id.into(),
            canonical_timestamp: canonical_timestamp.into(),
            expiration_seconds,
        }
    }

    /// Retrieve the access key id.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Retrieve the canonical timestamp.
    #[inline]
    pub fn canonical_timestamp(&self) -> &str {
        &self.canonical_timestamp
    }

    /// Retrieve the expiration in seconds.
    #[inline]
    pub fn expiration_seconds(&self) -> i64 {
        self.expiration_seconds
    }
}

impl Display for SigningKeyInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}/{}/{}", BCE_AUTH_VERSION, self.access_key_id, self.canonical_timestamp, self.expiration_seconds)
    }
}

/// The per-request signing key: `hex(HMAC_SHA256(secretAccessKey, signingKeyInfo))`.
///
/// The hex string itself (not the raw digest) is the HMAC key for the final signature.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    /// Lowercase hex encoding of the derived key.
    key: String,
}

impl SigningKey {
    /// Derive the signing key for `info` from the secret access key in `credentials`.
    pub fn derive(credentials: &Credentials, info: &SigningKeyInfo) -> Self {
        let key = hmac_sha256_hex(credentials.secret_access_key().as_bytes(), info.to_string().as_bytes());
        debug_assert_eq!(key.len(), SHA256_HEX_LENGTH);
        Self {
            key,
        }
    }

    /// Sign a canonical request with this key, returning the lowercase hex signature.
    pub fn sign(&self, canonical_request: &str) -> String {
        hmac_sha256_hex(self.key.as_bytes(), canonical_request.as_bytes())
    }
}

impl AsRef<str> for SigningKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SigningKey")
    }
}

impl Display for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SigningKey")
    }
}
