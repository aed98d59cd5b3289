pub mod feed;
pub mod profile;
pub mod record;
pub mod status;
pub mod week;

/// Parse a `KEY=VALUE` attribute flag.
pub fn parse_attr(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
