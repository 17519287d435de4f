use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

/// Decodes an unpadded base64url segment, tolerating trailing `=` padding
/// that some providers still emit in JWK parameters.
pub(crate) fn decode_url(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('='))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_unpadded_and_padded_forms() {
        assert_eq!(decode_url("AQAB").unwrap(), vec![1, 0, 1]);
        assert_eq!(decode_url("YQ").unwrap(), b"a".to_vec());
        assert_eq!(decode_url("YQ==").unwrap(), b"a".to_vec());
    }

    #[test]
    fn rejects_standard_alphabet() {
        assert!(decode_url("a+b/").is_err());
    }
}
