//! Thin wrapper around the QR rendering crate: text in, PNG bytes out.

use qrcode_generator::QrCodeEcc;

/// Rendered image edge length in pixels.
const IMAGE_SIZE: usize = 256;

/// Pure transform; the same input always yields the same bytes. Fails when
/// the payload cannot fit a QR symbol (too long for the error-correction
/// level).
pub fn encode(text: &str) -> anyhow::Result<Vec<u8>> {
    qrcode_generator::to_png_to_vec(text, QrCodeEcc::Medium, IMAGE_SIZE)
        .map_err(|e| anyhow::anyhow!("{e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn encode_produces_png_bytes() {
        let png = encode("hello").expect("encode should succeed");
        assert!(png.starts_with(PNG_MAGIC));
    }

    #[test]
    fn encode_is_deterministic() {
        assert_eq!(encode("hello").unwrap(), encode("hello").unwrap());
        assert_ne!(encode("hello").unwrap(), encode("world").unwrap());
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        // Well past the QR capacity limit for byte-mode data.
        let huge = "x".repeat(5000);
        assert!(encode(&huge).is_err());
    }

    #[test]
    fn encode_accepts_empty_input() {
        // Non-empty input is the form's job to enforce, not the encoder's.
        assert!(encode("").is_ok());
    }
}
