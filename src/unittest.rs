use {
    crate::{
        canonical::CanonicalRequest, content_md5_bytes, ClientConfig, Credentials, FixedClock, Protocol, SignRequest,
        SignatureEngine, SigningKey, SigningKeyInfo, Timestamp,
    },
    chrono::{DateTime, Utc},
    std::collections::BTreeSet,
};

const AK: &str = "aafe4bd5e3a14c1f8bd9e1b2a7b5f64d";
const SK: &str = "b1a6b0f5ebbb4f1aa0c0e1f1bf8d0e2e";
const TS: &str = "2015-04-27T08:23:49Z";

fn clock() -> FixedClock {
    FixedClock(DateTime::<Utc>::from_timestamp(1430123029, 0).unwrap())
}

fn upload_part() -> SignRequest {
    SignRequest::builder()
        .method("PUT")
        .canonical_uri("/v1/test/myfolder/readme.txt")
        .header("Host", "bj.bcebos.com")
        .header("Date", "Mon, 27 Apr 2015 16:23:49 +0800")
        .header("Content-Type", "text/plain")
        .header("Content-Length", "8")
        .header("Content-Md5", "NFzcPqhviddjRNnSOGo4rw==")
        .header("x-bce-date", TS)
        .query_param("partNumber", Some("9"))
        .query_param("uploadId", Some("a44cc9bab11cbd156984767aad637851"))
        .timestamp(TS)
        .build()
        .unwrap()
}

#[test_log::test]
fn check_upload_part_vector() {
    let token = SignatureEngine::with_clock(clock()).sign(&Credentials::new(AK, SK), &upload_part()).unwrap();
    assert_eq!(
        token,
        "bce-auth-v1/aafe4bd5e3a14c1f8bd9e1b2a7b5f64d/2015-04-27T08:23:49Z/1800//134a936121fa274b17d46f873cc88c70a9bc0f590e2a75d798714576e3c66ab9"
    );
}

#[test_log::test]
fn check_canonical_request_for_upload_part() {
    let cr = CanonicalRequest::from_sign_request(&upload_part());
    assert_eq!(cr.canonical_query_string(), "partNumber=9&uploadId=a44cc9bab11cbd156984767aad637851");

    // Date is not in the default set.
    assert_eq!(
        cr.canonical_headers(),
        "content-length:8\ncontent-md5:NFzcPqhviddjRNnSOGo4rw%3D%3D\ncontent-type:text%2Fplain\nhost:bj.bcebos.com\nx-bce-date:2015-04-27T08%3A23%3A49Z"
    );
}

#[test_log::test]
fn check_pieces_compose() {
    let credentials = Credentials::new("AK", "SK");
    let request = SignRequest::builder().method("GET").canonical_uri("/v1/object").timestamp(TS).build().unwrap();

    let info = SigningKeyInfo::new("AK", TS, 1800);
    let key = SigningKey::derive(&credentials, &info);
    let signature = key.sign(&CanonicalRequest::from_sign_request(&request).canonical_request());
    let token = SignatureEngine::with_clock(clock()).sign(&credentials, &request).unwrap();
    assert_eq!(token, format!("{}//{}", info, signature));
}

#[test_log::test]
fn check_deterministic() {
    let engine = SignatureEngine::with_clock(clock());
    let credentials = Credentials::new(AK, SK);
    let first = engine.sign(&credentials, &upload_part()).unwrap();
    for _ in 0..5 {
        assert_eq!(engine.sign(&credentials, &upload_part()).unwrap(), first);
    }
}

#[test_log::test]
fn check_unix_epoch_start_formatted() {
    let request = SignRequest::builder()
        .method("GET")
        .canonical_uri("/v1/object")
        .timestamp(Timestamp::Formatted("1970-01-01T00:00:00Z".to_string()))
        .build()
        .unwrap();
    let token = SignatureEngine::with_clock(clock()).sign(&Credentials::new("AK", "SK"), &request).unwrap();
    assert_eq!(
        token,
        "bce-auth-v1/AK/1970-01-01T00:00:00Z/1800//f10b1d164acca74baec93b577a9390744f4fa6f929fa7bdb40c0bbd44a4a998b"
    );
}

#[test_log::test]
fn check_epoch_one_second() {
    let request =
        SignRequest::builder().method("GET").canonical_uri("/v1/object").timestamp(Timestamp::Epoch(1)).build().unwrap();
    let token = SignatureEngine::with_clock(clock()).sign(&Credentials::new("AK", "SK"), &request).unwrap();
    assert_eq!(
        token,
        "bce-auth-v1/AK/1970-01-01T00:00:01Z/1800//3f07f55f6fb61b7ef7f6291a7942c0e70065d6c195c3946365ef6d5baa39db9c"
    );
}

#[test_log::test]
fn check_signed_headers_listed_sorted() {
    let mut builder = SignRequest::builder();
    builder
        .method("GET")
        .canonical_uri("/")
        .header("Host", "h")
        .header("X-Bce-Meta-A", "1")
        .headers_to_sign(["X-Bce-Meta-A", "host"])
        .timestamp(TS);
    let request = builder.build().unwrap();
    assert_eq!(request.headers_to_sign(), &BTreeSet::from(["host".to_string(), "x-bce-meta-a".to_string()]));

    let token = SignatureEngine::with_clock(clock()).sign(&Credentials::new("AK", "SK"), &request).unwrap();
    let parts: Vec<&str> = token.split('/').collect();
    assert_eq!(parts.len(), 6);
    assert_eq!(parts[4], "host;x-bce-meta-a");
    assert_eq!(parts[5].len(), 64);
}

#[test_log::test]
fn check_client_config_host_header_signs() {
    let config = ClientConfig::from_endpoint("bj.bcebos.com:8080", Protocol::Http, Credentials::new("AK", "SK")).unwrap();
    let request = SignRequest::builder()
        .method("PUT")
        .canonical_uri("/v1/bucket/object")
        .header("Host", config.host_header())
        .header("Content-Md5", content_md5_bytes(b"hello"))
        .timestamp(TS)
        .build()
        .unwrap();

    let engine = SignatureEngine::with_clock(clock());
    let token = engine.sign(config.credentials(), &request).unwrap();
    engine.verify(config.credentials(), &request, &token).unwrap();

    let cr = CanonicalRequest::from_sign_request(&request);
    assert!(cr.canonical_headers().contains("host:bj.bcebos.com%3A8080"));
}
