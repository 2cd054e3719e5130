use {
    crate::constants::SHA256_OUTPUT_LEN,
    base64::{engine::general_purpose::STANDARD as BASE64, Engine as _},
    hmac::{Hmac, Mac},
    sha2::Sha256,
};

type HmacSha256 = Hmac<Sha256>;

/// Wrapper function to form a HMAC-SHA256 operation.
#[inline(always)]
pub(crate) fn hmac_sha256(key: &[u8], value: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(value);
    mac.finalize().into_bytes().into()
}

#[inline(always)]
pub(crate) fn hmac_sha256_hex(key: &[u8], value: &[u8]) -> String {
    hex::encode(hmac_sha256(key, value))
}

#[inline(always)]
pub(crate) fn base64_encode<T: AsRef<[u8]>>(input: T) -> String {
    BASE64.encode(input)
}
