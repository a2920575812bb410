//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

use image_processor::OutputFormat;

use super::defaults::{FORMAT, OFFSET, PREFIX, SIZE};

static RE_SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,5}[xX]\d{1,5}$").unwrap());
static RE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d{1,5}\s*,\s*-?\d{1,5}$").unwrap());

const MAX_PREFIX_LEN: usize = 64;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        SIZE => {
            if !RE_SIZE.is_match(value) {
                return Err("must look like WxH, e.g. 56x56".into());
            }
            if value.split(['x', 'X']).any(|n| n.trim_start_matches('0').is_empty()) {
                return Err("width and height must be non-zero".into());
            }
        }
        OFFSET => {
            if !RE_OFFSET.is_match(value) {
                return Err("must look like X,Y, e.g. 10,0".into());
            }
        }
        FORMAT => {
            value
                .parse::<OutputFormat>()
                .map_err(|_| "must be one of png, jpeg, bmp, gif, tiff, webp")?;
        }
        PREFIX => {
            if value.len() > MAX_PREFIX_LEN {
                return Err(format!("must be at most {MAX_PREFIX_LEN} characters"));
            }
            if value.contains(['/', '\\']) {
                return Err("must not contain path separators".into());
            }
        }
        _ => {}
    }
    Ok(())
}
