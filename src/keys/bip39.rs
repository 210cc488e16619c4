//! BIP-39 mnemonic sentences: entropy ⇄ word list, and mnemonic ⇒ seed via
//! PBKDF2-HMAC-SHA-512 (spec §4.5).

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha512;

use crate::hash::sha256;
use crate::{Error, Result};

const WORDLIST_TEXT: &str = include_str!("../mnemonic/english.txt");

fn wordlist() -> Vec<&'static str> {
    WORDLIST_TEXT.lines().collect()
}

const VALID_ENTROPY_BITS: [usize; 5] = [128, 160, 192, 224, 256];

/// Encodes raw entropy (16/20/24/28/32 bytes) as a space-joined mnemonic.
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<String> {
    let bits = entropy.len() * 8;
    if !VALID_ENTROPY_BITS.contains(&bits) {
        return Err(Error::MalformedLength(
            "entropy length must be 16, 20, 24, 28, or 32 bytes",
        ));
    }
    let words = wordlist();
    let checksum_bits = bits / 32;
    let checksum_byte = sha256(entropy)[0];

    // Concatenate entropy bits with the checksum bits, then split into
    // 11-bit groups.
    let mut bitstream: Vec<u8> = Vec::with_capacity(bits + checksum_bits);
    for byte in entropy {
        for i in (0..8).rev() {
            bitstream.push((byte >> i) & 1);
        }
    }
    for i in (8 - checksum_bits..8).rev() {
        bitstream.push((checksum_byte >> i) & 1);
    }

    let mut out_words = Vec::with_capacity(bitstream.len() / 11);
    for chunk in bitstream.chunks(11) {
        let mut index = 0usize;
        for &bit in chunk {
            index = (index << 1) | bit as usize;
        }
        out_words.push(words[index]);
    }
    Ok(out_words.join(" "))
}

/// Parses a mnemonic back into its entropy, verifying the checksum.
pub fn mnemonic_to_entropy(mnemonic: &str) -> Result<Vec<u8>> {
    let words = wordlist();
    let mnemonic_words: Vec<&str> = mnemonic.split_whitespace().collect();
    let word_count = mnemonic_words.len();
    let total_bits = word_count * 11;
    let entropy_bits = total_bits * 32 / 33;
    if !VALID_ENTROPY_BITS.contains(&entropy_bits) {
        return Err(Error::MalformedEncoding("invalid mnemonic word count"));
    }
    let checksum_bits = entropy_bits / 32;

    let mut bitstream: Vec<u8> = Vec::with_capacity(total_bits);
    for word in &mnemonic_words {
        let index = words
            .iter()
            .position(|w| w == word)
            .ok_or(Error::MalformedEncoding("word not in BIP-39 wordlist"))?;
        for i in (0..11).rev() {
            bitstream.push(((index >> i) & 1) as u8);
        }
    }

    let (entropy_bitstream, checksum_bitstream) = bitstream.split_at(entropy_bits);
    let mut entropy = vec![0u8; entropy_bits / 8];
    for (i, chunk) in entropy_bitstream.chunks(8).enumerate() {
        let mut byte = 0u8;
        for &bit in chunk {
            byte = (byte << 1) | bit;
        }
        entropy[i] = byte;
    }

    let expected_checksum_byte = sha256(&entropy)[0];
    let mut actual = 0u8;
    for &bit in checksum_bitstream {
        actual = (actual << 1) | bit;
    }
    let expected = expected_checksum_byte >> (8 - checksum_bits);
    if actual != expected {
        return Err(Error::MalformedEncoding("mnemonic checksum mismatch"));
    }
    Ok(entropy)
}

/// Derives the 64-byte BIP-39 seed from a mnemonic and optional
/// passphrase: `PBKDF2-HMAC-SHA-512(mnemonic, "mnemonic" ∥ passphrase,
/// 2048, 64)`. Does not validate the mnemonic's checksum; callers that
/// need that should call [`mnemonic_to_entropy`] first.
#[must_use]
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> [u8; 64] {
    let salt = format!("mnemonic{passphrase}");
    let mut seed = [0u8; 64];
    pbkdf2::<Hmac<Sha512>>(mnemonic.as_bytes(), salt.as_bytes(), 2048, &mut seed)
        .expect("pbkdf2 output length is fixed and valid");
    seed
}
