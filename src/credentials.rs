use {
    crate::{
        constants::{HTTPS_DEFAULT_PORT, HTTP_DEFAULT_PORT},
        endpoint::parse_endpoint,
        SignatureError,
    },
    derive_builder::Builder,
    std::{
        fmt::{Debug, Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// A BCE access key id and secret access key.
///
/// The secret is never printed by the `Debug` or `Display` implementations.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The access key id; this appears in every signature token.
    access_key_id: String,

    /// The secret access key; this is only ever used as HMAC key material.
    secret_access_key: String,
}

impl Credentials {
    /// Create a new `Credentials` value.
    pub fn new<A, S>(access_key_id: A, secret_access_key: S) -> Self
    where
        A: Into<String>,
        S: Into<String>,
    {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Retrieve the access key id.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Retrieve the secret access key.
    #[inline]
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl Display for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.access_key_id)
    }
}

/// The protocol used to talk to the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Plain HTTP, port 80 by default.
    Http,

    /// HTTP over TLS, port 443 by default.
    #[default]
    Https,
}

impl Protocol {
    /// The URI scheme for this protocol.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// The port used when an endpoint does not specify one.
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::Http => HTTP_DEFAULT_PORT,
            Self::Https => HTTPS_DEFAULT_PORT,
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, SignatureError> {
        if s.eq_ignore_ascii_case("http") {
            Ok(Self::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Self::Https)
        } else {
            Err(SignatureError::UnsupportedProtocol(format!("Unsupported protocol {}", s)))
        }
    }
}

/// Client configuration: where the service lives and who is calling it.
///
/// ClientConfig structs are immutable. Use [`ClientConfig::from_endpoint`] or
/// [`ClientConfigBuilder`] to construct one.
#[derive(Builder, Clone, Debug, PartialEq, Eq)]
#[builder(build_fn(validate = "Self::validate", error = "SignatureError"))]
pub struct ClientConfig {
    /// The protocol to use.
    #[builder(default)]
    protocol: Protocol,

    /// The host name or IP address of the service.
    #[builder(setter(into))]
    host: String,

    /// The port of the service; defaults to the protocol's default port.
    #[builder(setter(strip_option), default)]
    port: Option<u16>,

    /// The credentials used to sign requests.
    credentials: Credentials,
}

impl ClientConfigBuilder {
    fn validate(&self) -> Result<(), SignatureError> {
        match &self.host {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(SignatureError::InvalidEndpoint("Host must not be empty".to_string())),
        }
    }
}

impl From<derive_builder::UninitializedFieldError> for SignatureError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        SignatureError::InvalidArgument(e.to_string())
    }
}

impl ClientConfig {
    /// Create a [ClientConfigBuilder] to construct a [ClientConfig].
    #[inline]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create a configuration from an endpoint string such as `bj.bcebos.com` or
    /// `https://host:8443`. `default_protocol` is used when the endpoint has no scheme.
    pub fn from_endpoint(
        endpoint: &str,
        default_protocol: Protocol,
        credentials: Credentials,
    ) -> Result<Self, SignatureError> {
        let (protocol, host, port) = parse_endpoint(endpoint, default_protocol)?;
        Ok(Self {
            protocol,
            host,
            port: Some(port),
            credentials,
        })
    }

    /// Retrieve the protocol.
    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Retrieve the host.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Retrieve the port, falling back to the protocol's default port.
    #[inline]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.protocol.default_port())
    }

    /// Retrieve the credentials.
    #[inline]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The value for the `Host` header: the host, plus the port if it is not the protocol's default.
    pub fn host_header(&self) -> String {
        let host = bracket_ipv6(&self.host);
        if self.port() == self.protocol.default_port() {
            host
        } else {
            format!("{}:{}", host, self.port())
        }
    }

    /// The base URL of the service, always including the port.
    pub fn endpoint_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, bracket_ipv6(&self.host), self.port())
    }
}

fn bracket_ipv6(host: &str) -> String {
    if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}
