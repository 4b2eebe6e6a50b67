//! Content cipher for ciphered-variant payloads.
//!
//! Payloads are XORed against a fixed 36-byte ASCII key. The keystream phase
//! depends only on a byte's position within its own payload and starts two
//! bytes into the key. The key ships with every reader and is not a secret;
//! the transform obfuscates, it does not protect.

/// The fixed content key.
pub const CONTENT_KEY: &[u8; 36] = b"7f13a9cf-2f55-4898-8294-b6b0655d59f1";

/// Keystream offset applied before indexing into the key.
const KEY_PHASE: usize = 2;

/// Key byte applied at `position` within a payload.
#[inline]
pub const fn key_byte(position: usize) -> u8 {
    CONTENT_KEY[(position + KEY_PHASE) % CONTENT_KEY.len()]
}

/// Apply the cipher in place.
///
/// The transform is its own inverse.
pub fn apply_in_place(data: &mut [u8]) {
    for (position, byte) in data.iter_mut().enumerate() {
        *byte ^= key_byte(position);
    }
}

/// Apply the cipher to a new buffer.
pub fn apply(data: &[u8]) -> Vec<u8> {
    let mut buffer = data.to_vec();
    apply_in_place(&mut buffer);
    buffer
}

/// Decipher a payload. Same transform as [`encode`].
#[inline]
pub fn decode(data: &[u8]) -> Vec<u8> {
    apply(data)
}

/// Encipher a payload. Same transform as [`decode`].
#[inline]
pub fn encode(data: &[u8]) -> Vec<u8> {
    apply(data)
}
