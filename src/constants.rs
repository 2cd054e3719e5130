//! Common constants used throughout the crate.
//!
//! This was consolidated here so the entire crate is on the same page about these constant values.
//! If a value is spelled incorrectly, at least it can be fixed in one spot.
//!
//! Tests that are testing the content of an error code or message should not use these constants;
//! they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically. (This can be a bit hard with comments, etc.)

/// Allowed clock skew, in minutes, for a token whose timestamp lies in the future.
pub(crate) const ALLOWED_MISMATCH_MINUTES: i64 = 15;

/// Authentication version prefix for BCE v1 signatures.
pub(crate) const BCE_AUTH_VERSION: &str = "bce-auth-v1";

/// Prefix of the service-reserved headers that are signed by default.
pub(crate) const BCE_HEADER_PREFIX: &str = "x-bce-";

/// Canonical timestamp format: `YYYY-MM-DDTHH:MM:SSZ`.
pub(crate) const CANONICAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Default chunk size used when digesting a stream.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Default signature lifetime, in seconds.
pub const DEFAULT_EXPIRATION_SECONDS: i64 = 1800;

/// Headers signed by default in addition to the `x-bce-` prefixed headers.
pub(crate) const DEFAULT_HEADERS_TO_SIGN: [&str; 4] = [HDR_CONTENT_LENGTH, HDR_CONTENT_MD5, HDR_CONTENT_TYPE, HDR_HOST];

/// Error code: ExpiredToken
pub(crate) const ERR_CODE_EXPIRED_TOKEN: &str = "ExpiredToken";

/// Error code: IncompleteSignature
pub(crate) const ERR_CODE_INCOMPLETE_SIGNATURE: &str = "IncompleteSignature";

/// Error code: InternalFailure
pub(crate) const ERR_CODE_INTERNAL_FAILURE: &str = "InternalFailure";

/// Error code: InvalidAccessKeyId
pub(crate) const ERR_CODE_INVALID_ACCESS_KEY_ID: &str = "InvalidAccessKeyId";

/// Error code: InvalidArgument
pub(crate) const ERR_CODE_INVALID_ARGUMENT: &str = "InvalidArgument";

/// Error code: InvalidEndpoint
pub(crate) const ERR_CODE_INVALID_ENDPOINT: &str = "InvalidEndpoint";

/// Error code: MissingCredential
pub(crate) const ERR_CODE_MISSING_CREDENTIAL: &str = "MissingCredential";

/// Error code: SignatureDoesNotMatch
pub(crate) const ERR_CODE_SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

/// Error code: UnsupportedProtocol
pub(crate) const ERR_CODE_UNSUPPORTED_PROTOCOL: &str = "UnsupportedProtocol";

/// Header for `authorization`
pub(crate) const HDR_AUTHORIZATION: &str = "authorization";

/// Header for `content-length`
pub(crate) const HDR_CONTENT_LENGTH: &str = "content-length";

/// Header for `content-md5`
pub(crate) const HDR_CONTENT_MD5: &str = "content-md5";

/// Header for `content-type`
pub(crate) const HDR_CONTENT_TYPE: &str = "content-type";

/// Header for `host`
pub(crate) const HDR_HOST: &str = "host";

/// Uppercase hex digits.
pub(crate) const HEX_DIGITS_UPPER: [u8; 16] =
    [b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'A', b'B', b'C', b'D', b'E', b'F'];

/// Default port for HTTP.
pub(crate) const HTTP_DEFAULT_PORT: u16 = 80;

/// Default port for HTTPS.
pub(crate) const HTTPS_DEFAULT_PORT: u16 = 443;

/// Largest read buffer allocated when digesting a stream, regardless of the requested chunk size.
pub(crate) const MAX_CHUNK_SIZE: usize = DEFAULT_CHUNK_SIZE * 128;

/// Error message: `"Access key id must not be empty"`
pub(crate) const MSG_EMPTY_ACCESS_KEY_ID: &str = "Access key id must not be empty";

/// Error message: `"Secret access key must not be empty"`
pub(crate) const MSG_EMPTY_SECRET_ACCESS_KEY: &str = "Secret access key must not be empty";

/// Error message: `"The request signature we calculated does not match the signature you provided."`
pub(crate) const MSG_REQUEST_SIGNATURE_MISMATCH: &str =
    "The request signature we calculated does not match the signature you provided.";

/// Error message: `"Authorization must have exactly 6 slash-delimited elements, e.g. bce-auth-v1/ak/timestamp/expiration/headers/signature"`
pub(crate) const MSG_TOKEN_MUST_HAVE_SIX_PARTS: &str = "Authorization must have exactly 6 slash-delimited elements, e.g. bce-auth-v1/ak/timestamp/expiration/headers/signature";

/// Length of a SHA-256 hex string.
pub(crate) const SHA256_HEX_LENGTH: usize = 64;

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;
