use rand::RngCore;
use rand::rngs::OsRng;

use crate::HandshakeError;

/// Random bytes drawn per token, before truncation.
pub const TOKEN_BYTES: usize = 16;

/// Hex characters kept from the end of the encoded bytes (16-bit space).
pub const DEFAULT_TOKEN_LEN: usize = 4;

/// Produces tokens for the publisher. Seam for tests.
pub trait TokenSource: Send + Sync {
    fn generate(&self) -> Result<String, HandshakeError>;
}

/// Draws [`TOKEN_BYTES`] from the OS CSPRNG, hex-encodes them and keeps the
/// last `len` characters.
///
/// Short tokens are meant to be read by a human. Collisions are possible and
/// nothing downstream treats a token as unique.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerator {
    len: usize,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self { len: DEFAULT_TOKEN_LEN }
    }
}

impl TokenGenerator {
    pub fn new(len: usize) -> Result<Self, HandshakeError> {
        if len == 0 || len > TOKEN_BYTES * 2 {
            return Err(HandshakeError::Config(format!(
                "token length must be within 1..={}, got {len}",
                TOKEN_BYTES * 2
            )));
        }
        Ok(Self { len })
    }

    pub fn token_len(&self) -> usize {
        self.len
    }

    /// Generate a token from an explicit RNG. Never falls back to another
    /// source if `rng` fails.
    pub fn generate_from<R: RngCore + ?Sized>(&self, rng: &mut R) -> Result<String, HandshakeError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|e| HandshakeError::Entropy(e.to_string()))?;
        let full = hex::encode(bytes);
        Ok(full[full.len() - self.len..].to_string())
    }
}

impl TokenSource for TokenGenerator {
    fn generate(&self) -> Result<String, HandshakeError> {
        self.generate_from(&mut OsRng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng([u8; TOKEN_BYTES]);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.copy_from_slice(&self.0[..dest.len()]);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    struct DrainedRng;

    impl RngCore for DrainedRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    #[test]
    fn keeps_last_hex_chars() {
        let mut bytes = [0u8; TOKEN_BYTES];
        bytes[14] = 0xa1;
        bytes[15] = 0xf3;
        let token = TokenGenerator::default().generate_from(&mut FixedRng(bytes)).unwrap();
        assert_eq!(token, "a1f3");
    }

    #[test]
    fn os_tokens_are_short_lowercase_hex() {
        let generator = TokenGenerator::default();
        for _ in 0..32 {
            let token = generator.generate().unwrap();
            assert_eq!(token.len(), DEFAULT_TOKEN_LEN);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn full_length_token_uses_all_bytes() {
        let generator = TokenGenerator::new(32).unwrap();
        let token = generator.generate_from(&mut FixedRng([0xab; TOKEN_BYTES])).unwrap();
        assert_eq!(token, "ab".repeat(TOKEN_BYTES));
    }

    #[test]
    fn entropy_failure_is_surfaced() {
        let err = TokenGenerator::default().generate_from(&mut DrainedRng).unwrap_err();
        assert!(matches!(err, HandshakeError::Entropy(_)));
    }

    #[test]
    fn rejects_out_of_range_length() {
        assert!(matches!(TokenGenerator::new(0), Err(HandshakeError::Config(_))));
        assert!(matches!(TokenGenerator::new(33), Err(HandshakeError::Config(_))));
    }
}
