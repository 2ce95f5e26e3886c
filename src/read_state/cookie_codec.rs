//! Cookie value format for the read set.
//!
//! The ids are joined with `,`, zlib compressed and base64 encoded with the URL-safe
//! alphabet so the result can travel as a cookie value unquoted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use std::io::{Read, Write};

use super::{PostId, ReadPostSet, ReadStateError};

const SEPARATOR: char = ',';

/// Upper bound on the inflated payload. Larger values are treated as malformed.
pub const MAX_DECODED_LEN: u64 = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CookieDecodeError {
    #[error("cookie value is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("cookie value is not a valid zlib stream: {0}")]
    Decompress(#[from] std::io::Error),
    #[error("decompressed cookie value exceeds {0} bytes")]
    TooLarge(u64),
    #[error("decompressed cookie value is not utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("cookie value contains an invalid post id: {0}")]
    InvalidId(#[from] ReadStateError),
}

pub fn encode_read_posts(read_posts: &ReadPostSet) -> Result<String, ReadStateError> {
    let joined = read_posts
        .iter()
        .map(PostId::to_string)
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string());

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(joined.as_bytes())
        .map_err(|e| ReadStateError::Encoding(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| ReadStateError::Encoding(e.to_string()))?;

    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Parses a cookie value produced by [`encode_read_posts`].
///
/// Whitespace around ids is ignored, so values written with a `", "` separator
/// decode as well.
pub fn decode_read_posts(value: &str) -> Result<ReadPostSet, CookieDecodeError> {
    let compressed = URL_SAFE_NO_PAD.decode(value.trim())?;

    let mut decompressed = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(MAX_DECODED_LEN + 1)
        .read_to_end(&mut decompressed)?;
    if decompressed.len() as u64 > MAX_DECODED_LEN {
        return Err(CookieDecodeError::TooLarge(MAX_DECODED_LEN));
    }
    let joined = String::from_utf8(decompressed)?;

    joined
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<PostId>().map_err(CookieDecodeError::from))
        .collect()
}
