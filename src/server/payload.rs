/// Symbols repeated to fill every payload: uppercase, lowercase, digits.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Builds a payload of exactly `size` bytes where byte `i` is
/// `ALPHABET[i % 62]`. Non-positive sizes yield an empty payload.
#[must_use]
pub fn generate(size: i64) -> Vec<u8> {
    let Ok(len) = usize::try_from(size) else {
        return Vec::new();
    };
    ALPHABET.iter().copied().cycle().take(len).collect()
}
