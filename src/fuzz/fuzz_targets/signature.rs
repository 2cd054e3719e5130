#![no_main]
use {
    arbitrary::Arbitrary,
    chrono::{DateTime, Utc},
    http::{header::HeaderName, Method, Request, Uri},
    libfuzzer_sys::{fuzz_target, Corpus},
    scratchstack_bce_signature::{parse_endpoint, Credentials, FixedClock, Protocol, SignRequest, SignatureEngine},
    std::error::Error,
};

#[derive(Arbitrary, Debug)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct SignInput {
    endpoint: String,
    method: HttpMethod,
    uri: String,
    headers: Vec<(String, String)>,
    headers_to_sign: Vec<String>,
    expiration_seconds: i64,
}

fuzz_target!(|data: SignInput| -> Corpus {
    let result = run_target(data);
    result.map(|_| Corpus::Keep).unwrap_or(Corpus::Reject)
});

fn run_target(data: SignInput) -> Result<(), Box<dyn Error>> {
    let _ = parse_endpoint(&data.endpoint, Protocol::Https);

    let uri = Uri::from_maybe_shared(data.uri)?;
    let method: Method = data.method.into();
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in data.headers.iter() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let (parts, _) = builder.body(())?.into_parts();

    let server_timestamp = DateTime::<Utc>::from_timestamp(1430123029, 0).ok_or("timestamp")?;
    let engine = SignatureEngine::with_clock(FixedClock(server_timestamp));
    let credentials = Credentials::new("AK", "SK");

    // Signed header names end up in the token, so they must be valid header names.
    let headers_to_sign = data.headers_to_sign.into_iter().filter(|h| HeaderName::from_bytes(h.as_bytes()).is_ok());

    let request = SignRequest::builder_from_http_request_parts(&parts)?
        .headers_to_sign(headers_to_sign)
        .expiration_seconds(data.expiration_seconds)
        .build()?;

    if let Ok(token) = engine.sign(&credentials, &request) {
        // Anything that signs must verify, unless its lifetime has already run out.
        if data.expiration_seconds > 0 {
            assert!(engine.verify(&credentials, &request, &token).is_ok(), "token failed to verify: {}", token);
        }
    }
    Ok(())
}
