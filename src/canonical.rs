//! Canonicalization functionality for signature generation and validation.
//!
//! This includes the BCE URI encoding, header and query string canonicalization, and the ability
//! to create a BCE v1 canonical request.
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.
//! The functions and types are subject to change in minor/patch versions. This is exposed for
//! testing purposes only.

use {
    crate::{
        constants::{BCE_HEADER_PREFIX, DEFAULT_HEADERS_TO_SIGN, HDR_AUTHORIZATION, HEX_DIGITS_UPPER},
        SignRequest,
    },
    log::trace,
    qualifier_attr::qualifiers,
    std::{
        collections::{BTreeSet, HashSet},
        fmt::{Debug, Formatter, Result as FmtResult},
    },
};

/// A canonicalized request for BCE v1.
///
/// This is mainly used internally for generating the canonical request for signing, but is
/// exposed for testing and debugging purposes.
///
/// **The stability of this struct is not guaranteed.** The fields and methods are subject to
/// change in minor/patch versions.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[derive(Clone, PartialEq, Eq)]
struct CanonicalRequest {
    /// The HTTP method for the request (e.g., "GET", "PUT", etc.)
    request_method: String,

    /// The canonical URI, used as given by the caller.
    canonical_uri: String,

    /// The canonical query string; the `authorization` parameter is already excluded.
    canonical_query_string: String,

    /// The newline-joined canonical headers.
    canonical_headers: String,
}

impl CanonicalRequest {
    /// Create a [CanonicalRequest] from a [SignRequest].

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn from_sign_request(request: &SignRequest) -> Self {
        Self {
            request_method: request.method().to_string(),
            canonical_uri: request.canonical_uri().to_string(),
            canonical_query_string: canonicalize_query(
                request.query_params().iter().map(|(k, v)| (k, v.as_deref())),
                true,
            ),
            canonical_headers: canonicalize_headers(request.headers(), request.headers_to_sign()),
        }
    }

    /// Retrieve the HTTP request method.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn request_method(&self) -> &str {
        &self.request_method
    }

    /// Retrieve the canonical URI.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn canonical_uri(&self) -> &str {
        &self.canonical_uri
    }

    /// Retrieve the canonical query string.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn canonical_query_string(&self) -> &str {
        &self.canonical_query_string
    }

    /// Retrieve the canonical headers.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn canonical_headers(&self) -> &str {
        &self.canonical_headers
    }

    /// Get the canonical request to sign: method, URI, query string, and headers joined by newlines.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn canonical_request(&self) -> String {
        let result = [
            self.request_method(),
            self.canonical_uri(),
            self.canonical_query_string(),
            self.canonical_headers(),
        ]
        .join("\n");

        trace!("Canonical request:\n{}", result);
        result
    }
}

impl Debug for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CanonicalRequest")
            .field("request_method", &self.request_method)
            .field("canonical_uri", &self.canonical_uri)
            .field("canonical_query_string", &self.canonical_query_string)
            .field("canonical_headers", &self.canonical_headers)
            .finish()
    }
}

/// Appends path components to a base URI.
///
/// Empty components are skipped. Each component is URI-encoded with slashes preserved, and the
/// slashes at every junction are collapsed so exactly one separates adjacent parts.
pub fn append_uri<S: AsRef<str>>(base_uri: &str, path_components: &[S]) -> String {
    let components: Vec<String> = path_components
        .iter()
        .map(|c| c.as_ref())
        .filter(|c: &&str| !c.is_empty())
        .map(|c| normalize_string(c, false))
        .collect();

    if components.is_empty() {
        return base_uri.to_string();
    }

    let last = components.len() - 1;
    let mut parts = Vec::with_capacity(components.len() + 1);
    parts.push(base_uri.trim_end_matches('/'));

    for (i, component) in components.iter().enumerate() {
        let component = if i == last {
            component.trim_start_matches('/')
        } else {
            component.trim_matches('/')
        };
        parts.push(component);
    }

    parts.join("/")
}

/// Produce the canonical headers string.
///
/// With an empty `headers_to_sign`, `host`, `content-md5`, `content-length`, `content-type`, and
/// every `x-bce-` prefixed header are signed. Otherwise exactly the named headers are signed.
/// Header names are compared case-insensitively. The result is sorted, so the iteration order of
/// `headers` does not matter.
pub fn canonicalize_headers<I, K, V>(headers: I, headers_to_sign: &BTreeSet<String>) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let explicit: HashSet<String> = headers_to_sign.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut results = Vec::new();

    for (key, value) in headers {
        let key = key.as_ref().trim().to_lowercase();

        let signable = if explicit.is_empty() {
            is_default_header_to_sign(&key)
        } else {
            explicit.contains(&key)
        };

        if signable {
            results.push(format!("{}:{}", normalize_string(&key, true), normalize_string(value.as_ref().trim(), true)));
        }
    }

    results.sort_unstable();
    results.join("\n")
}

/// Produce the canonical query string.
///
/// When `for_signature` is set, the `authorization` parameter (compared case-insensitively) is
/// left out. Missing values are treated as empty strings.
pub fn canonicalize_query<I, K, V>(query_parameters: I, for_signature: bool) -> String
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut results = Vec::new();

    for (key, value) in query_parameters {
        let key = key.as_ref();

        if for_signature && key.eq_ignore_ascii_case(HDR_AUTHORIZATION) {
            continue;
        }

        let value: &str = match &value {
            Some(v) => v.as_ref(),
            None => "",
        };
        results.push(format!("{}={}", normalize_string(key, true), normalize_string(value, true)));
    }

    results.sort_unstable();
    results.join("&")
}

/// Retrieve a header value by name, ignoring case and surrounding whitespace in the name.
pub fn get_header_ignore_case<'a, I, K, V>(headers: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: AsRef<str> + ?Sized + 'a,
    V: AsRef<str> + ?Sized + 'a,
{
    let name = name.trim();
    headers.into_iter().find(|(k, _)| k.as_ref().trim().eq_ignore_ascii_case(name)).map(|(_, v)| v.as_ref())
}

/// Indicates whether a lower-cased header name is signed when no explicit set is given.
#[inline]
pub fn is_default_header_to_sign(header: &str) -> bool {
    header.starts_with(BCE_HEADER_PREFIX) || DEFAULT_HEADERS_TO_SIGN.contains(&header)
}

/// Indicates whether the specified byte is left alone by [normalize_string] -- i.e., can be
/// represented without being percent-encoded, e.g. '?' -> '%3F'.
#[inline(always)]
pub fn is_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// Convert a Latin-1 slice of bytes to a UTF-8 string.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    let mut result = String::new();
    for b in bytes {
        result.push(*b as char);
    }
    result
}

/// URI-encode a string the way BCE expects (`UriEncode()` in the service documentation).
///
/// Every byte of the UTF-8 representation is percent-encoded using uppercase hex, except for
/// `A-Z`, `a-z`, `0-9`, `.`, `~`, `-`, and `_`. If `encode_slash` is false, `/` is also left
/// alone.
pub fn normalize_string(value: &str, encode_slash: bool) -> String {
    let mut result = Vec::with_capacity(value.len() * 3);

    for c in value.bytes() {
        if is_unreserved(c) || (c == b'/' && !encode_slash) {
            result.push(c);
        } else {
            result.push(b'%');
            result.extend(u8_to_upper_hex(c));
        }
    }

    // Only ASCII bytes were pushed.
    latin1_to_string(&result)
}

/// Convert a byte to uppercase hex representation.
#[inline(always)]
pub const fn u8_to_upper_hex(b: u8) -> [u8; 2] {
    let result: [u8; 2] = [HEX_DIGITS_UPPER[((b >> 4) & 0xf) as usize], HEX_DIGITS_UPPER[(b & 0xf) as usize]];
    result
}

#[cfg(test)]
mod tests {
    use {
        super::{
            append_uri, canonicalize_headers, canonicalize_query, get_header_ignore_case, latin1_to_string,
            normalize_string, u8_to_upper_hex, CanonicalRequest,
        },
        crate::SignRequest,
        quickcheck::quickcheck,
        std::collections::{BTreeSet, HashMap},
    };

    fn no_headers_to_sign() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test_log::test]
    fn test_normalize_unreserved() {
        let unreserved = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.~-_";
        assert_eq!(normalize_string(unreserved, true), unreserved);
        assert_eq!(normalize_string(unreserved, false), unreserved);
    }

    #[test_log::test]
    fn test_normalize_reserved() {
        assert_eq!(normalize_string("a/b", true), "a%2Fb");
        assert_eq!(normalize_string("a/b", false), "a/b");
        assert_eq!(normalize_string("a b+c=d&e", true), "a%20b%2Bc%3Dd%26e");
        assert_eq!(normalize_string("*", true), "%2A");
        assert_eq!(normalize_string("%2a", true), "%252a");
        assert_eq!(normalize_string("", true), "");
    }

    #[test_log::test]
    fn test_normalize_multibyte() {
        assert_eq!(normalize_string("/v1/测试 a+b", false), "/v1/%E6%B5%8B%E8%AF%95%20a%2Bb");
        assert_eq!(normalize_string("é", true), "%C3%A9");
    }

    #[test_log::test]
    fn test_default_signable_headers() {
        let headers = HashMap::from([("Host", "h"), ("X-Bce-Date", "d"), ("Other", "x")]);
        let result = canonicalize_headers(&headers, &no_headers_to_sign());
        assert_eq!(result, "host:h\nx-bce-date:d");
    }

    #[test_log::test]
    fn test_default_headers_full() {
        let headers = vec![
            ("Host", "bj.bcebos.com"),
            ("Date", "Mon, 27 Apr 2015 16:23:49 +0800"),
            ("Content-Type", "text/plain"),
            ("Content-Length", "8"),
            ("Content-Md5", "NFzcPqhviddjRNnSOGo4rw=="),
            ("x-bce-date", "2015-04-27T08:23:49Z"),
        ];
        let result = canonicalize_headers(headers, &no_headers_to_sign());
        assert_eq!(
            result,
            "content-length:8\n\
             content-md5:NFzcPqhviddjRNnSOGo4rw%3D%3D\n\
             content-type:text%2Fplain\n\
             host:bj.bcebos.com\n\
             x-bce-date:2015-04-27T08%3A23%3A49Z"
        );
    }

    #[test_log::test]
    fn test_explicit_headers_to_sign() {
        let headers = vec![("Host", "h"), ("X-Bce-Date", "d"), ("Other", " x "), ("Content-Type", "t")];
        let to_sign = BTreeSet::from(["HOST".to_string(), "other".to_string()]);
        let result = canonicalize_headers(headers, &to_sign);
        assert_eq!(result, "host:h\nother:x");
    }

    #[test_log::test]
    fn test_header_trimming() {
        let headers = vec![("  Host ", "  bj.bcebos.com \t")];
        assert_eq!(canonicalize_headers(headers, &no_headers_to_sign()), "host:bj.bcebos.com");
    }

    #[test_log::test]
    fn test_no_headers() {
        let headers: Vec<(String, String)> = vec![];
        assert_eq!(canonicalize_headers(headers, &no_headers_to_sign()), "");
    }

    quickcheck! {
        fn prop_header_order_independent(headers: Vec<(String, String)>) -> bool {
            let mut reversed = headers.clone();
            reversed.reverse();
            let mut rotated = headers.clone();
            if !rotated.is_empty() {
                rotated.rotate_left(1);
            }

            // Force everything into the signable set.
            let prefixed: Vec<(String, String)> =
                headers.iter().map(|(k, v)| (format!("x-bce-{}", k), v.clone())).collect();
            let mut prefixed_reversed = prefixed.clone();
            prefixed_reversed.reverse();

            let none = BTreeSet::new();
            canonicalize_headers(headers.clone(), &none) == canonicalize_headers(reversed, &none)
                && canonicalize_headers(headers, &none) == canonicalize_headers(rotated, &none)
                && canonicalize_headers(prefixed, &none) == canonicalize_headers(prefixed_reversed, &none)
        }

        fn prop_query_order_independent(params: Vec<(String, Option<String>)>) -> bool {
            let mut reversed = params.clone();
            reversed.reverse();
            canonicalize_query(params, true) == canonicalize_query(reversed, true)
        }
    }

    #[test_log::test]
    fn test_query_empty() {
        let params: Vec<(String, Option<String>)> = Vec::new();
        assert_eq!(canonicalize_query(params.clone(), true), "");
        assert_eq!(canonicalize_query(params, false), "");
    }

    #[test_log::test]
    fn test_query_sorted_and_encoded() {
        let params = vec![
            ("uploadId", Some("a44cc9bab11cbd156984767aad637851")),
            ("partNumber", Some("9")),
            ("acl", None),
            ("prefix", Some("dir/sub dir")),
        ];
        assert_eq!(
            canonicalize_query(params, true),
            "acl=&partNumber=9&prefix=dir%2Fsub%20dir&uploadId=a44cc9bab11cbd156984767aad637851"
        );
    }

    #[test_log::test]
    fn test_query_excludes_authorization() {
        let params = vec![("Authorization", Some("bce-auth-v1/...")), ("b", Some("B")), ("a", Some("A"))];
        assert_eq!(canonicalize_query(params.clone(), true), "a=A&b=B");
        assert_eq!(canonicalize_query(params, false), "Authorization=bce-auth-v1%2F...&a=A&b=B");
    }

    #[test_log::test]
    fn test_append_uri() {
        assert_eq!(append_uri("/v1", &["bucket", "key"]), "/v1/bucket/key");
        assert_eq!(append_uri("/v1/", &["/bucket/", "", "/dir/key"]), "/v1/bucket/dir/key");
        assert_eq!(append_uri("/v1", &["my bucket", "a/b c"]), "/v1/my%20bucket/a/b%20c");
        assert_eq!(append_uri::<&str>("/v1/", &[]), "/v1/");
        assert_eq!(append_uri("/v1/", &["", ""]), "/v1/");
        assert_eq!(append_uri("/v1", &["key/"]), "/v1/key/");
    }

    #[test_log::test]
    fn test_get_header_ignore_case() {
        let headers = HashMap::from([("Content-Type".to_string(), "text/plain".to_string())]);
        assert_eq!(get_header_ignore_case(&headers, "content-type"), Some("text/plain"));
        assert_eq!(get_header_ignore_case(&headers, " CONTENT-TYPE "), Some("text/plain"));
        assert_eq!(get_header_ignore_case(&headers, "host"), None);
    }

    #[test_log::test]
    fn test_canonical_request() {
        let request = SignRequest::builder()
            .method("PUT")
            .canonical_uri("/v1/bucket/key")
            .header("Host", "bj.bcebos.com")
            .header("Other", "x")
            .query_param("acl", None::<String>)
            .query_param("authorization", Some("abc"))
            .build()
            .unwrap();
        let cr = CanonicalRequest::from_sign_request(&request);
        assert_eq!(cr.request_method(), "PUT");
        assert_eq!(cr.canonical_uri(), "/v1/bucket/key");
        assert_eq!(cr.canonical_query_string(), "acl=");
        assert_eq!(cr.canonical_headers(), "host:bj.bcebos.com");
        assert_eq!(cr.canonical_request(), "PUT\n/v1/bucket/key\nacl=\nhost:bj.bcebos.com");

        let debug = format!("{:?}", cr);
        assert!(debug.starts_with("CanonicalRequest {"));
        assert_eq!(cr.clone(), cr);
    }

    #[test_log::test]
    fn test_u8_to_upper_hex() {
        for i in 0..=255 {
            let result = u8_to_upper_hex(i);
            assert_eq!(String::from_utf8_lossy(result.as_slice()), format!("{:02X}", i));
        }
    }

    #[test_log::test]
    fn test_latin1() {
        assert_eq!(latin1_to_string(b"abc\xe9"), "abc\u{e9}");
    }
}
