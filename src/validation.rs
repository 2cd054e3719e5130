//! Argument validation.
//!
//! Each public operation calls the relevant checks here before doing any work, so a failure is
//! reported as a typed [`SignatureError`] and nothing is partially computed.

use {
    crate::{constants::*, Credentials, SignatureError},
    lazy_static::lazy_static,
    regex::Regex,
    std::collections::BTreeSet,
};

lazy_static! {
    /// Bucket names: lowercase letters, digits, and hyphens; starting with a letter or digit.
    static ref BUCKET_NAME_REGEX: Regex = Regex::new(r"^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$").unwrap();

    /// Dotted-quad IPv4 address with an optional port.
    static ref IPV4_HOST_REGEX: Regex = Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})(?::\d*)?$").unwrap();
}

/// Ensure neither half of the credentials is empty.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), SignatureError> {
    if credentials.access_key_id().is_empty() {
        return Err(SignatureError::MissingCredential(MSG_EMPTY_ACCESS_KEY_ID.to_string()));
    }

    if credentials.secret_access_key().is_empty() {
        return Err(SignatureError::MissingCredential(MSG_EMPTY_SECRET_ACCESS_KEY.to_string()));
    }

    Ok(())
}

/// Ensure the signature lifetime is not negative.
pub fn validate_expiration_seconds(expiration_seconds: i64) -> Result<(), SignatureError> {
    if expiration_seconds < 0 {
        Err(SignatureError::InvalidArgument(format!(
            "Expiration must not be negative: {}",
            expiration_seconds
        )))
    } else {
        Ok(())
    }
}

/// Ensure the HTTP method is present and a valid token.
pub fn validate_method(method: &str) -> Result<(), SignatureError> {
    if method.is_empty() {
        return Err(SignatureError::InvalidArgument("HTTP method must not be empty".to_string()));
    }

    if http::Method::from_bytes(method.as_bytes()).is_err() {
        return Err(SignatureError::InvalidArgument(format!("Invalid HTTP method: {}", method)));
    }

    Ok(())
}

/// Ensure the values copied verbatim into an authorization token cannot break its `/` and `;`
/// delimiters.
pub fn validate_token_fields(access_key_id: &str, headers_to_sign: &BTreeSet<String>) -> Result<(), SignatureError> {
    if access_key_id.contains('/') {
        return Err(SignatureError::InvalidArgument(format!(
            "Access key id must not contain '/': {}",
            access_key_id
        )));
    }

    for name in headers_to_sign {
        if name.is_empty() || name.contains('/') || name.contains(';') {
            return Err(SignatureError::InvalidArgument(format!("Invalid header name to sign: '{}'", name)));
        }
    }

    Ok(())
}

/// Ensure a read chunk size is positive.
pub fn validate_chunk_size(chunk_size: usize) -> Result<(), SignatureError> {
    if chunk_size == 0 {
        Err(SignatureError::InvalidArgument("Chunk size must be positive".to_string()))
    } else {
        Ok(())
    }
}

/// Indicates whether the bucket name is acceptable to the service: 3 to 63 characters of
/// lowercase letters, digits, and hyphens, starting and ending with a letter or digit.
pub fn is_valid_bucket_name(bucket: &str) -> bool {
    BUCKET_NAME_REGEX.is_match(bucket)
}

/// Indicates whether the host (optionally followed by `:port`) is `localhost` or an IPv4 address.
pub fn is_ip_host(host: &str) -> bool {
    let name = host.split(':').next().unwrap_or_default();
    if name == "localhost" {
        return true;
    }

    match IPV4_HOST_REGEX.captures(host) {
        Some(cap) => (1..=4).all(|i| cap[i].parse::<u8>().is_ok()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{
            is_ip_host, is_valid_bucket_name, validate_chunk_size, validate_credentials, validate_expiration_seconds,
            validate_method, validate_token_fields,
        },
        crate::{Credentials, SignatureError},
        std::collections::BTreeSet,
    };

    #[test_log::test]
    fn test_credentials() {
        assert!(validate_credentials(&Credentials::new("AK", "SK")).is_ok());

        let e = validate_credentials(&Credentials::new("", "SK")).unwrap_err();
        assert!(matches!(e, SignatureError::MissingCredential(_)));
        assert_eq!(e.to_string(), "Access key id must not be empty");

        let e = validate_credentials(&Credentials::new("AK", "")).unwrap_err();
        assert!(matches!(e, SignatureError::MissingCredential(_)));
        assert_eq!(e.to_string(), "Secret access key must not be empty");
    }

    #[test_log::test]
    fn test_expiration() {
        assert!(validate_expiration_seconds(0).is_ok());
        assert!(validate_expiration_seconds(1800).is_ok());
        let e = validate_expiration_seconds(-1).unwrap_err();
        assert_eq!(e.to_string(), "Expiration must not be negative: -1");
    }

    #[test_log::test]
    fn test_method() {
        assert!(validate_method("GET").is_ok());
        assert!(validate_method("PUT").is_ok());
        assert!(matches!(validate_method(""), Err(SignatureError::InvalidArgument(_))));
        assert!(matches!(validate_method("GE T"), Err(SignatureError::InvalidArgument(_))));
    }

    #[test_log::test]
    fn test_token_fields() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();

        assert!(validate_token_fields("AK", &BTreeSet::new()).is_ok());
        assert!(validate_token_fields("AK", &names(&["host", "x-bce-date"])).is_ok());

        let e = validate_token_fields("A/K", &BTreeSet::new()).unwrap_err();
        assert!(matches!(e, SignatureError::InvalidArgument(_)));
        assert_eq!(e.to_string(), "Access key id must not contain '/': A/K");

        for bad in ["a/b", "a;b", ""] {
            let e = validate_token_fields("AK", &names(&["host", bad])).unwrap_err();
            assert_eq!(e.to_string(), format!("Invalid header name to sign: '{}'", bad));
        }
    }

    #[test_log::test]
    fn test_chunk_size() {
        assert!(validate_chunk_size(1).is_ok());
        assert!(validate_chunk_size(0).is_err());
    }

    #[test_log::test]
    fn test_bucket_names() {
        assert!(is_valid_bucket_name("abc"));
        assert!(is_valid_bucket_name("my-bucket-01"));
        assert!(is_valid_bucket_name("0bucket"));
        assert!(is_valid_bucket_name(&"a".repeat(63)));

        assert!(!is_valid_bucket_name("ab"));
        assert!(!is_valid_bucket_name(&"a".repeat(64)));
        assert!(!is_valid_bucket_name("bucket-"));
        assert!(!is_valid_bucket_name("-bucket"));
        assert!(!is_valid_bucket_name("Bucket"));
        assert!(!is_valid_bucket_name("my_bucket"));
        assert!(!is_valid_bucket_name("my.bucket"));
    }

    #[test_log::test]
    fn test_ip_hosts() {
        assert!(is_ip_host("127.0.0.1"));
        assert!(is_ip_host("10.0.0.1:8080"));
        assert!(is_ip_host("localhost"));
        assert!(is_ip_host("localhost:8080"));

        assert!(!is_ip_host("256.0.0.1"));
        assert!(!is_ip_host("1.2.3"));
        assert!(!is_ip_host("bj.bcebos.com"));
        assert!(!is_ip_host(""));
    }
}
