/// Errors raised while validating input or writing rendered output.
///
/// Encoding itself cannot fail once the input has been accepted, so the input
/// variants are returned before any matrix or bar sequence is built.
/// [`CodeError::InvalidRenderSize`], [`CodeError::Image`] and [`CodeError::Io`]
/// come from rendering and writing output.
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    /// The barcode input is not a non-negative integer.
    #[error("wrong input type, only non-negative integer values allowed: {0:?}")]
    InvalidInputType(String),

    /// The input holds more digits (barcode) or bytes (QR code) than allowed.
    #[error("input too large: {len} exceeds the maximum of {max}")]
    InputTooLarge { len: usize, max: usize },

    /// A pinned QR version outside 2..=4, or `None` when no supported
    /// version can hold the data.
    #[error("{}", unsupported_version_message(.0))]
    UnsupportedVersion(Option<u8>),

    /// Rendering parameters give a zero unit or an image wider than `u32` pixels.
    #[error("invalid render size: {0}")]
    InvalidRenderSize(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn unsupported_version_message(version: &Option<u8>) -> String {
    match *version {
        Some(v) => format!("unsupported QR version: {} (supported: 2-4)", v),
        None => "data too large for supported QR versions (2-4)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_display() {
        let pinned = CodeError::UnsupportedVersion(Some(7));
        assert_eq!(pinned.to_string(), "unsupported QR version: 7 (supported: 2-4)");

        let none = CodeError::UnsupportedVersion(None);
        assert!(none.to_string().contains("data too large"));
    }

    #[test]
    fn test_input_too_large_display() {
        let err = CodeError::InputTooLarge { len: 12, max: 11 };
        assert_eq!(err.to_string(), "input too large: 12 exceeds the maximum of 11");
    }

    #[test]
    fn test_invalid_render_size_display() {
        let err = CodeError::InvalidRenderSize("unit must be positive".to_string());
        assert_eq!(err.to_string(), "invalid render size: unit must be positive");
    }
}
