use std::ops::Range;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::SizeLimitExceeded;

/// Unit names for [`format_human_size`], in steps of 1024.
const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Decimal places used when the caller asks for none.
const DEFAULT_DECIMALS: usize = 2;

/// Base64 text of a payload.
///
/// Always ASCII, so character offsets and byte offsets coincide and any
/// range within `0..len()` is a valid slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    /// Wraps text that is already encoded, e.g. a document handed over as
    /// base64. Returns `None` for non-ASCII input.
    pub fn from_text(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        text.is_ascii().then_some(Self(text))
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the characters in `range`.
    ///
    /// Panics if `range` is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> &str {
        &self.0[range]
    }
}

/// Encodes `payload` as standard padded base64.
pub fn encode(payload: &[u8]) -> EncodedPayload {
    EncodedPayload(STANDARD.encode(payload))
}

/// Checks the raw (pre-encoding) size of `payload` against `max_bytes`.
pub fn check_size_limit(payload: &[u8], max_bytes: u64) -> Result<(), SizeLimitExceeded> {
    let actual = payload.len() as u64;
    if actual > max_bytes {
        return Err(SizeLimitExceeded {
            actual,
            max: max_bytes,
        });
    }
    Ok(())
}

/// Formats a byte count in the largest whole base-1024 unit.
///
/// The value is rounded half away from zero to `decimals` places (`0` means
/// the default of 2) and trailing zeros are dropped, so `1024` renders as
/// `"1 KB"`, `1152` as `"1.13 KB"` and `1_500_000` as `"1.43 MB"`.
pub fn format_human_size(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && unit < UNITS.len() - 1 {
        scaled /= 1024;
        unit += 1;
    }

    let decimals = if decimals == 0 { DEFAULT_DECIMALS } else { decimals };
    let scale = 10f64.powi(decimals as i32);
    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (value * scale).round() / scale;
    let mut text = format!("{rounded:.decimals$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    format!("{text} {}", UNITS[unit])
}

/// [`format_human_size`] with the default two decimal places.
pub fn format_bytes(bytes: u64) -> String {
    format_human_size(bytes, DEFAULT_DECIMALS)
}
