use {
    crate::constants::*,
    http::status::StatusCode,
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
        io::Error as IOError,
    },
};

/// Error returned when an attempt at creating or verifying a BCE v1 signature fails.
#[derive(Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// The signature token has expired: its timestamp plus its expiration lies in the past.
    ExpiredToken(/* message */ String),

    /// Digesting a stream failed due to an underlying I/O error.
    IO(IOError),

    /// The signature token does not have the `bce-auth-v1/ak/timestamp/expiration/headers/signature` shape.
    IncompleteSignature(/* message */ String),

    /// The access key in the signature token does not match the credentials it was verified against.
    InvalidAccessKeyId(/* message */ String),

    /// An argument was outside of its allowed domain, e.g. a negative expiration or a malformed timestamp.
    InvalidArgument(/* message */ String),

    /// The endpoint string could not be parsed as `[scheme://]host[:port]`.
    InvalidEndpoint(/* message */ String),

    /// The access key id or the secret access key is empty.
    MissingCredential(/* message */ String),

    /// Signature did not match the calculated signature value, or is not yet current.
    SignatureDoesNotMatch(Option</* message */ String>),

    /// The endpoint uses a scheme other than `http` or `https`.
    UnsupportedProtocol(/* message */ String),
}

impl SignatureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ExpiredToken(_) => ERR_CODE_EXPIRED_TOKEN,
            Self::IO(_) => ERR_CODE_INTERNAL_FAILURE,
            Self::IncompleteSignature(_) => ERR_CODE_INCOMPLETE_SIGNATURE,
            Self::InvalidAccessKeyId(_) => ERR_CODE_INVALID_ACCESS_KEY_ID,
            Self::InvalidArgument(_) => ERR_CODE_INVALID_ARGUMENT,
            Self::InvalidEndpoint(_) => ERR_CODE_INVALID_ENDPOINT,
            Self::MissingCredential(_) => ERR_CODE_MISSING_CREDENTIAL,
            Self::SignatureDoesNotMatch(_) => ERR_CODE_SIGNATURE_DOES_NOT_MATCH,
            Self::UnsupportedProtocol(_) => ERR_CODE_UNSUPPORTED_PROTOCOL,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::IncompleteSignature(_)
            | Self::InvalidArgument(_)
            | Self::InvalidEndpoint(_)
            | Self::MissingCredential(_)
            | Self::UnsupportedProtocol(_) => StatusCode::BAD_REQUEST,
            Self::IO(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl ServiceError for SignatureError {
    fn error_code(&self) -> &'static str {
        SignatureError::error_code(self)
    }

    fn http_status(&self) -> StatusCode {
        SignatureError::http_status(self)
    }
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::ExpiredToken(msg) => f.write_str(msg),
            Self::IO(ref e) => Display::fmt(e, f),
            Self::IncompleteSignature(msg) => f.write_str(msg),
            Self::InvalidAccessKeyId(msg) => f.write_str(msg),
            Self::InvalidArgument(msg) => f.write_str(msg),
            Self::InvalidEndpoint(msg) => f.write_str(msg),
            Self::MissingCredential(msg) => f.write_str(msg),
            Self::SignatureDoesNotMatch(msg) => {
                if let Some(msg) = msg {
                    f.write_str(msg)
                } else {
                    Ok(())
                }
            }
            Self::UnsupportedProtocol(msg) => f.write_str(msg),
        }
    }
}

impl Error for SignatureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IO(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<IOError> for SignatureError {
    fn from(e: IOError) -> SignatureError {
        SignatureError::IO(e)
    }
}
