use {
    crate::{
        canonical::{latin1_to_string, normalize_string, CanonicalRequest},
        chronoutil::{format_canonical_time, parse_canonical_time},
        constants::*,
        validation::{validate_credentials, validate_expiration_seconds, validate_method, validate_token_fields},
        Clock, Credentials, SignatureError, SigningKey, SigningKeyInfo, SystemClock, Timestamp,
    },
    chrono::Duration,
    derive_builder::Builder,
    http::{
        header::{HeaderValue, AUTHORIZATION},
        request::Parts,
    },
    log::{debug, trace},
    percent_encoding::percent_decode_str,
    std::collections::{BTreeSet, HashMap},
    subtle::ConstantTimeEq,
};

/// A request to be signed.
///
/// SignRequest structs are immutable. Use [`SignRequestBuilder`] to construct one, or
/// [`SignRequest::builder_from_http_request_parts`] to start from an `http` request.
#[derive(Builder, Clone, Debug, PartialEq, Eq)]
#[builder(build_fn(error = "SignatureError"), derive(Debug))]
pub struct SignRequest {
    /// The HTTP method, e.g. `GET` or `PUT`. Used verbatim.
    #[builder(setter(into))]
    method: String,

    /// The canonical (already URI-encoded) path, e.g. `/v1/bucket/key`. Used verbatim.
    #[builder(setter(into))]
    canonical_uri: String,

    /// The request headers.
    #[builder(setter(custom), default)]
    headers: HashMap<String, String>,

    /// The query parameters; a parameter without `=` has no value.
    #[builder(setter(custom), default)]
    query_params: HashMap<String, Option<String>>,

    /// The lower-cased names of the headers to sign. If empty, the default set is signed.
    #[builder(setter(custom), default)]
    headers_to_sign: BTreeSet<String>,

    /// When the request is signed.
    #[builder(setter(into), default)]
    timestamp: Timestamp,

    /// How long the signature remains valid, in seconds.
    #[builder(default = "DEFAULT_EXPIRATION_SECONDS")]
    expiration_seconds: i64,
}

impl SignRequestBuilder {
    /// Add a header. A header of the same name replaces the previous value.
    pub fn header<K, V>(&mut self, name: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.get_or_insert_with(HashMap::new).insert(name.into(), value.into());
        self
    }

    /// Add several headers.
    pub fn headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.header(name, value);
        }
        self
    }

    /// Add a query parameter. `None` is a parameter given without a value, e.g. `?acl`.
    pub fn query_param<K, V>(&mut self, name: K, value: Option<V>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params.get_or_insert_with(HashMap::new).insert(name.into(), value.map(Into::into));
        self
    }

    /// Add a header to the explicit set of headers to sign. Names are trimmed and lower-cased.
    pub fn header_to_sign<S: AsRef<str>>(&mut self, name: S) -> &mut Self {
        self.headers_to_sign.get_or_insert_with(BTreeSet::new).insert(name.as_ref().trim().to_lowercase());
        self
    }

    /// Add several headers to the explicit set of headers to sign.
    pub fn headers_to_sign<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.header_to_sign(name);
        }
        self
    }
}

impl SignRequest {
    /// Create a [SignRequestBuilder] to construct a [SignRequest].
    #[inline]
    pub fn builder() -> SignRequestBuilder {
        SignRequestBuilder::default()
    }

    /// Create a [SignRequestBuilder] pre-populated with the method, path, query parameters, and
    /// headers of an HTTP request.
    ///
    /// The path is percent-decoded and re-encoded with slashes preserved. Query parameter names and
    /// values are percent-decoded; if a name repeats, the last value wins. Repeated headers are
    /// joined with `,`. Any existing `Authorization` header is left out.
    ///
    /// Header values are read as Latin-1: each byte becomes the character with the same code
    /// point. Canonicalization percent-encodes the UTF-8 form of that string, so a raw `0xE9`
    /// byte is signed as `%C3%A9`, not `%E9`. Peers that sign such values must widen them the
    /// same way.
    pub fn builder_from_http_request_parts(parts: &Parts) -> Result<SignRequestBuilder, SignatureError> {
        let path = decode_component(parts.uri.path())?;
        let mut builder = Self::builder();
        builder.method(parts.method.as_str()).canonical_uri(normalize_string(&path, false));

        if let Some(query) = parts.uri.query() {
            for component in query.split('&').filter(|c| !c.is_empty()) {
                match component.split_once('=') {
                    Some((key, value)) => builder.query_param(decode_component(key)?, Some(decode_component(value)?)),
                    None => builder.query_param(decode_component(component)?, None::<String>),
                };
            }
        }

        let mut headers = HashMap::<String, String>::new();
        for (name, value) in parts.headers.iter() {
            if *name == AUTHORIZATION {
                continue;
            }

            let value = latin1_to_string(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.clone());
        }
        builder.headers(headers);

        trace!("Created sign request builder from {} {}", parts.method, parts.uri);
        Ok(builder)
    }

    /// Retrieve the HTTP method.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Retrieve the canonical URI.
    #[inline]
    pub fn canonical_uri(&self) -> &str {
        &self.canonical_uri
    }

    /// Retrieve the headers.
    #[inline]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Retrieve the query parameters.
    #[inline]
    pub fn query_params(&self) -> &HashMap<String, Option<String>> {
        &self.query_params
    }

    /// Retrieve the explicit headers to sign.
    #[inline]
    pub fn headers_to_sign(&self) -> &BTreeSet<String> {
        &self.headers_to_sign
    }

    /// Retrieve the timestamp.
    #[inline]
    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Retrieve the expiration in seconds.
    #[inline]
    pub fn expiration_seconds(&self) -> i64 {
        self.expiration_seconds
    }
}

fn decode_component(s: &str) -> Result<String, SignatureError> {
    match percent_decode_str(s).decode_utf8() {
        Ok(decoded) => Ok(decoded.into_owned()),
        Err(_) => Err(SignatureError::InvalidArgument(format!("Invalid UTF-8 in percent-encoded string: {}", s))),
    }
}

/// Produces and checks BCE v1 authorization tokens.
///
/// The engine reads the current time through its [Clock], which is only consulted when a request
/// uses [Timestamp::Now] and when verifying.
#[derive(Clone, Debug, Default)]
pub struct SignatureEngine<C: Clock = SystemClock> {
    clock: C,
}

impl SignatureEngine<SystemClock> {
    /// Create an engine that uses the system clock.
    pub fn new() -> Self {
        Self {
            clock: SystemClock,
        }
    }
}

impl<C: Clock> SignatureEngine<C> {
    /// Create an engine that uses the given clock.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
        }
    }

    /// Sign a request, returning the value for the `Authorization` header:
    /// `bce-auth-v1/{ak}/{timestamp}/{expiration}/{signed headers}/{signature}`.
    ///
    /// # Errors
    /// * [`SignatureError::MissingCredential`] if the access key id or secret is empty.
    /// * [`SignatureError::InvalidArgument`] if the expiration is negative, the method is empty, the
    ///   access key id contains `/`, a header name to sign is empty or contains `/` or `;`, or the
    ///   timestamp cannot be resolved.
    pub fn sign(&self, credentials: &Credentials, request: &SignRequest) -> Result<String, SignatureError> {
        validate_credentials(credentials)?;
        validate_expiration_seconds(request.expiration_seconds())?;
        validate_method(request.method())?;
        validate_token_fields(credentials.access_key_id(), request.headers_to_sign())?;

        let timestamp = request.timestamp().to_canonical_time(&self.clock)?;
        let info = SigningKeyInfo::new(credentials.access_key_id(), timestamp, request.expiration_seconds());
        let signing_key = SigningKey::derive(credentials, &info);
        let canonical_request = CanonicalRequest::from_sign_request(request);
        let signature = signing_key.sign(&canonical_request.canonical_request());

        let signed_headers = request.headers_to_sign().iter().map(String::as_str).collect::<Vec<_>>().join(";");

        debug!(
            "Signed request: method={} uri={} info={} signed_headers={:?}",
            request.method(),
            request.canonical_uri(),
            info,
            signed_headers
        );

        Ok(format!("{}/{}/{}", info, signed_headers, signature))
    }

    /// Verify an authorization token against a request and the caller's credentials.
    ///
    /// The timestamp, expiration, and signed headers are taken from the token; the request's own
    /// values for these are ignored.
    ///
    /// # Errors
    /// * [`SignatureError::IncompleteSignature`] if the token is malformed.
    /// * [`SignatureError::InvalidAccessKeyId`] if the token names a different access key.
    /// * [`SignatureError::ExpiredToken`] if the token's lifetime has passed.
    /// * [`SignatureError::SignatureDoesNotMatch`] if the token's timestamp is too far in the future
    ///   or the signature is wrong.
    pub fn verify(&self, credentials: &Credentials, request: &SignRequest, token: &str) -> Result<(), SignatureError> {
        validate_credentials(credentials)?;

        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() != 6 {
            trace!("verify: token has {} parts", parts.len());
            return Err(SignatureError::IncompleteSignature(MSG_TOKEN_MUST_HAVE_SIX_PARTS.to_string()));
        }

        let (version, access_key_id, timestamp, expiration, signed_headers, signature) =
            (parts[0], parts[1], parts[2], parts[3], parts[4], parts[5]);

        if version != BCE_AUTH_VERSION {
            return Err(SignatureError::IncompleteSignature(format!(
                "Unsupported authorization version '{}'",
                version
            )));
        }

        if access_key_id != credentials.access_key_id() {
            trace!("verify: access key id '{}' does not match credentials", access_key_id);
            return Err(SignatureError::InvalidAccessKeyId(format!(
                "The access key id '{}' does not match the credentials provided.",
                access_key_id
            )));
        }

        let Some(req_ts) = parse_canonical_time(timestamp) else {
            return Err(SignatureError::IncompleteSignature(format!(
                "Timestamp must be in 'YYYY-MM-DDTHH:MM:SSZ' format. Got '{}'",
                timestamp
            )));
        };

        let expiration_seconds = match expiration.parse::<i64>() {
            Ok(seconds) if seconds >= 0 => seconds,
            _ => {
                return Err(SignatureError::IncompleteSignature(format!("Invalid expiration '{}'", expiration)));
            }
        };

        // Date checks: not too far in the future, and not past its lifetime.
        let now = self.clock.now();
        let max_ts = now + Duration::minutes(ALLOWED_MISMATCH_MINUTES);
        if req_ts > max_ts {
            trace!("verify: request timestamp {} is later than {}", req_ts, max_ts);
            return Err(SignatureError::SignatureDoesNotMatch(Some(format!(
                "Signature not yet current: {} is still later than {} ({} + {} min.)",
                timestamp,
                format_canonical_time(&max_ts),
                format_canonical_time(&now),
                ALLOWED_MISMATCH_MINUTES
            ))));
        }

        let expires_at = Duration::try_seconds(expiration_seconds).and_then(|d| req_ts.checked_add_signed(d));
        if let Some(expires_at) = expires_at {
            if now > expires_at {
                trace!("verify: token expired at {}", expires_at);
                return Err(SignatureError::ExpiredToken(format!(
                    "Signature expired: {} is now earlier than {} ({} + {} sec.)",
                    format_canonical_time(&expires_at),
                    format_canonical_time(&now),
                    timestamp,
                    expiration_seconds
                )));
            }
        }

        let mut signed_request = request.clone();
        signed_request.timestamp = Timestamp::Formatted(timestamp.to_string());
        signed_request.expiration_seconds = expiration_seconds;
        signed_request.headers_to_sign =
            signed_headers.split(';').filter(|h| !h.is_empty()).map(|h| h.to_lowercase()).collect();

        let info = SigningKeyInfo::new(access_key_id, timestamp, expiration_seconds);
        let signing_key = SigningKey::derive(credentials, &info);
        let canonical_request = CanonicalRequest::from_sign_request(&signed_request);
        let expected_signature = signing_key.sign(&canonical_request.canonical_request());

        let is_equal: bool = signature.as_bytes().ct_eq(expected_signature.as_bytes()).into();
        if !is_equal {
            trace!("verify: signature mismatch: expected '{}', got '{}'", expected_signature, signature);
            return Err(SignatureError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())));
        }

        debug!("verify: signature valid for access_key_id={}", access_key_id);
        Ok(())
    }
}

/// Sign a request using the system clock. See [`SignatureEngine::sign`].
pub fn sign(credentials: &Credentials, request: &SignRequest) -> Result<String, SignatureError> {
    SignatureEngine::new().sign(credentials, request)
}

/// Set the `Authorization` header of an HTTP request to a signature token.
pub fn insert_authorization(parts: &mut Parts, token: &str) -> Result<(), SignatureError> {
    let value = HeaderValue::from_str(token)
        .map_err(|_| SignatureError::InvalidArgument(format!("Invalid Authorization header value: {}", token)))?;
    parts.headers.insert(AUTHORIZATION, value);
    Ok(())
}
