use thiserror::Error;

/// Errors produced when decoding a Base58Check string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base58Error {
    #[error("invalid base58 character {0:?}")]
    InvalidCharacter(char),

    #[error("invalid base58check checksum")]
    Checksum,

    #[error("base58check payload too short to hold a checksum")]
    TooShort,

    #[error("base58 decoding failed: {0}")]
    Other(String),
}

/// Encodes `payload` followed by the first four bytes of its double SHA-256.
pub fn check_encode(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decodes a Base58Check string and verifies its checksum, returning the payload.
pub fn check_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    bs58::decode(s)
        .with_check(None)
        .into_vec()
        .map_err(|err| map_decode_error(s, err))
}

fn map_decode_error(s: &str, err: bs58::decode::Error) -> Base58Error {
    use bs58::decode::Error;

    match err {
        Error::InvalidCharacter { character, .. } => Base58Error::InvalidCharacter(character),
        Error::NonAsciiCharacter { index } => s
            .get(index..)
            .and_then(|rest| rest.chars().next())
            .map_or(Base58Error::Other(err.to_string()), Base58Error::InvalidCharacter),
        Error::InvalidChecksum { .. } => Base58Error::Checksum,
        Error::NoChecksum => Base58Error::TooShort,
        other => Base58Error::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_zero_hash160_address() {
        let mut payload = [0u8; 21];
        payload[0] = 0x00;
        assert_eq!(check_encode(&payload), "1111111111111111111114oLvT2");
    }

    #[test]
    fn decode_returns_payload_without_checksum() {
        let decoded = check_decode("1111111111111111111114oLvT2").unwrap();
        assert_eq!(decoded, vec![0u8; 21]);
    }

    #[test]
    fn decode_rejects_bad_checksum() {
        assert_eq!(
            check_decode("1111111111111111111114oLvT3"),
            Err(Base58Error::Checksum)
        );
    }

    #[test]
    fn decode_rejects_character_outside_alphabet() {
        assert_eq!(
            check_decode("111111111111111111111O4oLvT2"),
            Err(Base58Error::InvalidCharacter('O'))
        );
        assert_eq!(check_decode("0"), Err(Base58Error::InvalidCharacter('0')));
    }

    #[test]
    fn decode_rejects_non_ascii() {
        assert_eq!(check_decode("11é"), Err(Base58Error::InvalidCharacter('é')));
    }

    #[test]
    fn decode_rejects_missing_checksum() {
        assert_eq!(check_decode(""), Err(Base58Error::TooShort));
        assert_eq!(check_decode("1"), Err(Base58Error::TooShort));
    }

    #[test]
    fn encode_decode_preserves_leading_zeros() {
        let payload = [0u8, 0, 0, 0x55, 0x37];
        let encoded = check_encode(&payload);
        assert!(encoded.starts_with("111"));
        assert_eq!(check_decode(&encoded).unwrap(), payload);
    }
}
