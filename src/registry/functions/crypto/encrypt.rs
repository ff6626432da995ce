//! $encrypt(string, key)

use crate::registry::function::{AnonymizerFunction, FunctionContext, FunctionError, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use blowfish::Blowfish;
use blowfish::cipher::generic_array::GenericArray;
use blowfish::cipher::{BlockEncrypt, KeyInit};

const KEY_BITS: usize = 128;
const NONCE: &str = "tszyihnnphlyeaglle";
const BLOCK: usize = 8;

/// Key text decoding tolerates non-zero bits after the last full byte
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// $encrypt() function - Blowfish encryption, base64 encoded
pub struct EncryptFunction;

/// Derive a 128-bit key from free text.
///
/// Characters outside the base64 alphabet are dropped, the remainder is padded
/// with a fixed nonce to 22 characters and decoded as base64.
pub fn encryption_key(key_text: &str) -> Vec<u8> {
    let required_chars = KEY_BITS.div_ceil(6);
    let group_chars = 4 * required_chars.div_ceil(4);

    let mut text: String = key_text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
        .collect();
    while text.len() < required_chars {
        text.push_str(NONCE);
    }
    text.truncate(required_chars);
    while text.len() < group_chars {
        text.push('=');
    }
    KEY_ENGINE.decode(text).unwrap_or_default()
}

fn encrypt(plain: &[u8], key: &[u8]) -> Option<Vec<u8>> {
    let cipher: Blowfish = Blowfish::new_from_slice(key).ok()?;
    let pad = BLOCK - plain.len() % BLOCK;
    let mut data = plain.to_vec();
    data.resize(plain.len() + pad, pad as u8);
    for block in data.chunks_exact_mut(BLOCK) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
    Some(data)
}

impl AnonymizerFunction for EncryptFunction {
    fn name(&self) -> &str {
        "$encrypt"
    }
    fn human_friendly_name(&self) -> &str {
        "Encrypt"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$encrypt",
                vec![
                    ParameterInfo::required("string", ParameterKind::Text),
                    ParameterInfo::required("key", ParameterKind::Text),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Encrypts the UTF-8 string with Blowfish (ECB, PKCS#5 padding) under a 128-bit key derived from the key text and returns base64. Holders of the key text can recover the original."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let key = encryption_key(&args[1]);
        let encrypted = encrypt(args[0].as_bytes(), &key)
            .ok_or_else(|| FunctionError::evaluation(self.name(), "invalid encryption key"))?;
        Ok(STANDARD.encode(encrypted))
    }
}
