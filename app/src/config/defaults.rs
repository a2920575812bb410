//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

pub const TEMPLATE: &str = "YELLS_AT_TEMPLATE";
pub const OUTPUT_DIR: &str = "YELLS_AT_OUTPUT_DIR";
pub const SIZE: &str = "YELLS_AT_SIZE";
pub const OFFSET: &str = "YELLS_AT_OFFSET";
pub const FORMAT: &str = "YELLS_AT_FORMAT";
pub const PREFIX: &str = "YELLS_AT_PREFIX";

/// Template file looked up in the working directory and the data directory.
pub const TEMPLATE_FILE_NAME: &str = "yells_at.png";

// An empty default means "computed at load time".
const DEFS: &[(&str, &str)] = &[
    (TEMPLATE, ""),      // template image the input is composited onto
    (OUTPUT_DIR, "."),   // directory results are written to
    (SIZE, "56x56"),     // box (WxH) the input is resized into
    (OFFSET, "10,0"),    // position (X,Y) on the template
    (FORMAT, "png"),     // png, jpeg, bmp, gif, tiff, webp
    (PREFIX, "yells_at_"),
];

/// Default values indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| DEFS.iter().copied().collect());

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_a_definition() {
        for key in [TEMPLATE, OUTPUT_DIR, SIZE, OFFSET, FORMAT, PREFIX] {
            assert!(get_default(key).is_some(), "{key} missing");
        }
        assert_eq!(DEFAULT_SETTINGS.len(), DEFS.len());
        assert!(get_default("UNKNOWN").is_none());
    }
}
