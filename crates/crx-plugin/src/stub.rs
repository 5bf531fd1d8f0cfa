//! Stub virtual entry module.
//!
//! Hosts shaped like Rollup refuse to build with an empty entry list. When
//! every real entry was re-routed into the asset pipeline, the rewritten
//! input names this reserved synthetic id instead; `resolve_id`/`load`
//! answer for it and for nothing else.

/// Reserved synthetic entry id.
///
/// The leading NUL byte follows the virtual-module convention: no real
/// filesystem path can ever collide with it.
pub const STUB_ID: &str = "\0crx:stub";

/// Whether an id is the stub entry.
pub fn is_stub(id: &str) -> bool {
    id == STUB_ID
}

/// Module source served for the stub entry.
pub fn stub_source() -> String {
    "console.log('crx stub entry');\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_id_is_not_a_real_path() {
        assert!(STUB_ID.starts_with('\0'));
        assert!(is_stub(STUB_ID));
        assert!(!is_stub("/src/manifest.json"));
        assert!(!is_stub("crx:stub"));
    }

    #[test]
    fn test_stub_source_is_valid_js_line() {
        assert!(stub_source().starts_with("console.log"));
    }
}
