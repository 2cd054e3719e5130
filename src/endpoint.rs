//! Endpoint string parsing.

use {
    crate::{Protocol, SignatureError},
    http::uri::Authority,
    log::debug,
    std::str::FromStr,
};

/// Parse the protocol, host, and port from an endpoint string of the form `[scheme://]host[:port]`.
///
/// If the endpoint contains no `//` separator, `default_protocol` supplies the scheme. A scheme
/// present in the endpoint always wins over `default_protocol`. When no port is given, the
/// protocol's default port is used.
///
/// Host names are returned lower-cased; IPv6 literals are returned without their brackets.
///
/// # Errors
/// * [`SignatureError::UnsupportedProtocol`] if the scheme is neither `http` nor `https`.
/// * [`SignatureError::InvalidEndpoint`] if the host or port cannot be parsed.
pub fn parse_endpoint(endpoint: &str, default_protocol: Protocol) -> Result<(Protocol, String, u16), SignatureError> {
    let invalid =
        |reason: &str| SignatureError::InvalidEndpoint(format!("Invalid endpoint: {}, error: {}", endpoint, reason));

    let (scheme, rest) = match endpoint.find("//") {
        None => (default_protocol.name(), endpoint),
        Some(pos) => {
            let scheme = match &endpoint[..pos] {
                "" => default_protocol.name(),
                prefix => match prefix.strip_suffix(':') {
                    Some(scheme) if is_valid_scheme(scheme) => scheme,
                    _ => return Err(invalid("malformed scheme")),
                },
            };
            (scheme, &endpoint[pos + 2..])
        }
    };

    let protocol = Protocol::from_str(scheme)?;

    // Only the authority is of interest; drop any path, query, or fragment.
    let authority_str = match rest.find(['/', '?', '#']) {
        Some(pos) => &rest[..pos],
        None => rest,
    };

    if authority_str.is_empty() {
        return Err(invalid("missing host"));
    }

    let port = explicit_port(authority_str).map_err(invalid)?;

    let authority = Authority::from_str(authority_str).map_err(|e| invalid(&e.to_string()))?;

    // Userinfo is not part of an endpoint.
    if authority.as_str().contains('@') {
        return Err(invalid("userinfo is not allowed"));
    }

    let host = authority.host().trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase();
    if host.is_empty() {
        return Err(invalid("missing host"));
    }

    let port = port.unwrap_or_else(|| protocol.default_port());

    debug!("Parsed endpoint {} as protocol={} host={} port={}", endpoint, protocol, host, port);
    Ok((protocol, host, port))
}

/// Extract the port from an authority, if one is given.
///
/// A trailing colon without digits is treated as "no port".
fn explicit_port(authority: &str) -> Result<Option<u16>, &'static str> {
    let after_host = if authority.starts_with('[') {
        match authority.find(']') {
            Some(pos) => &authority[pos + 1..],
            None => return Err("unterminated IPv6 literal"),
        }
    } else {
        match authority.find(':') {
            Some(pos) => &authority[pos..],
            None => "",
        }
    };

    match after_host {
        "" | ":" => Ok(None),
        _ => match after_host.strip_prefix(':') {
            Some(digits) if digits.bytes().all(|b| b.is_ascii_digit()) => {
                digits.parse::<u16>().map(Some).map_err(|_| "port out of range")
            }
            _ => Err("invalid port"),
        },
    }
}

/// Indicates whether the string is an RFC 3986 scheme: a letter followed by letters, digits, `+`, `-`, or `.`.
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        _ => false,
    }
}
