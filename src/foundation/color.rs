use crate::foundation::core::Bgra8;
use crate::foundation::error::{WavelockError, WavelockResult};

/// Parse `#rrggbb` (case-insensitive) into an opaque [`Bgra8`].
pub(crate) fn parse_hex(s: &str) -> Result<Bgra8, String> {
    let trimmed = s.trim();
    let Some(digits) = trimmed.strip_prefix('#') else {
        return Err(format!("color \"{s}\" must start with '#'"));
    };
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("color \"{s}\" must be a #rrggbb hex triplet"));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let r = hex_byte(&digits[0..2])?;
    let g = hex_byte(&digits[2..4])?;
    let b = hex_byte(&digits[4..6])?;
    Ok(Bgra8::opaque(r, g, b))
}

/// Parse a color string, naming `field` in the error.
pub(crate) fn parse_color_field(field: &str, s: &str) -> WavelockResult<Bgra8> {
    parse_hex(s).map_err(|reason| WavelockError::config(field, reason))
}

/// Parse an optional color string, naming `field` in the error.
pub(crate) fn parse_optional_color_field(
    field: &str,
    s: Option<&str>,
) -> WavelockResult<Option<Bgra8>> {
    s.map(|s| parse_color_field(field, s)).transpose()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
