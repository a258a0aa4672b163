//! Key handling and the signer abstraction.
//!
//! # Security
//! - Private keys are loaded from hex or environment variables only
//! - Keys are never logged; `Debug` output is redacted
//! - Signatures are `r || s`, each half padded to the curve order size

use std::fmt;
use std::str::FromStr;

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use thiserror::Error;

use crate::sdk::encoding::decode_hex;

const CURVE_ORDER_SIZE: usize = 32;

/// Domain tag prepended to user messages before signing.
pub const USER_DOMAIN_TAG: [u8; 32] = domain_tag(b"FLOW-V0.0-user");

/// Domain tag prepended to transaction payloads and envelopes before signing.
pub const TRANSACTION_DOMAIN_TAG: [u8; 32] = domain_tag(b"FLOW-V0.0-transaction");

const fn domain_tag(tag: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < tag.len() {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// Errors from key decoding, hashing and signing.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("hash algorithm {0} is not supported here")]
    UnsupportedHash(HashAlgorithm),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("environment variable {0} not set")]
    MissingEnv(String),
}

/// Signature algorithms accepted by Flow accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    #[serde(rename = "ECDSA_P256")]
    EcdsaP256,
    #[serde(rename = "ECDSA_secp256k1")]
    EcdsaSecp256k1,
}

impl SignatureAlgorithm {
    /// Access API code.
    pub fn code(self) -> u32 {
        match self {
            Self::EcdsaP256 => 2,
            Self::EcdsaSecp256k1 => 3,
        }
    }

    /// Raw value of Cadence's `SignatureAlgorithm` enum.
    pub fn cadence_index(self) -> u8 {
        match self {
            Self::EcdsaP256 => 1,
            Self::EcdsaSecp256k1 => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EcdsaP256 => "ECDSA_P256",
            Self::EcdsaSecp256k1 => "ECDSA_secp256k1",
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        [Self::EcdsaP256, Self::EcdsaSecp256k1]
            .into_iter()
            .find(|a| a.code() == code)
    }

    pub fn from_cadence_index(index: u8) -> Option<Self> {
        [Self::EcdsaP256, Self::EcdsaSecp256k1]
            .into_iter()
            .find(|a| a.cadence_index() == index)
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ECDSA_P256" | "P256" | "P-256" => Ok(Self::EcdsaP256),
            "ECDSA_SECP256K1" | "SECP256K1" => Ok(Self::EcdsaSecp256k1),
            _ => Err(CryptoError::InvalidKey(format!("unknown signature algorithm '{}'", s))),
        }
    }
}

/// Hash algorithms known to Flow accounts and Cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA2_256")]
    Sha2_256,
    #[serde(rename = "SHA2_384")]
    Sha2_384,
    #[serde(rename = "SHA3_256")]
    Sha3_256,
    #[serde(rename = "SHA3_384")]
    Sha3_384,
    #[serde(rename = "KMAC128")]
    Kmac128,
    #[serde(rename = "KECCAK256")]
    Keccak256,
}

impl HashAlgorithm {
    const ALL: [HashAlgorithm; 6] = [
        Self::Sha2_256,
        Self::Sha2_384,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Kmac128,
        Self::Keccak256,
    ];

    /// Access API code; only the account hashing algorithms have one.
    pub fn code(self) -> Option<u32> {
        match self {
            Self::Sha2_256 => Some(1),
            Self::Sha3_256 => Some(3),
            _ => None,
        }
    }

    /// Raw value of Cadence's `HashAlgorithm` enum.
    pub fn cadence_index(self) -> u8 {
        match self {
            Self::Sha2_256 => 1,
            Self::Sha2_384 => 2,
            Self::Sha3_256 => 3,
            Self::Sha3_384 => 4,
            Self::Kmac128 => 5,
            Self::Keccak256 => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sha2_256 => "SHA2_256",
            Self::Sha2_384 => "SHA2_384",
            Self::Sha3_256 => "SHA3_256",
            Self::Sha3_384 => "SHA3_384",
            Self::Kmac128 => "KMAC128",
            Self::Keccak256 => "KECCAK256",
        }
    }

    /// Digest size in bytes.
    pub fn output_size(self) -> usize {
        match self {
            Self::Sha2_384 | Self::Sha3_384 => 48,
            _ => 32,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.code() == Some(code))
    }

    pub fn from_cadence_index(index: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.cadence_index() == index)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|h| h.name() == normalized)
            .ok_or_else(|| CryptoError::InvalidKey(format!("unknown hash algorithm '{}'", s)))
    }
}

/// Message digest over one of the supported algorithms.
pub trait Hasher: Send + Sync {
    fn hash(&self, bytes: &[u8]) -> Vec<u8>;

    fn hash_as_hex(&self, bytes: &[u8]) -> String {
        hex::encode(self.hash(bytes))
    }
}

/// Hasher for the unkeyed digests.
#[derive(Debug, Clone, Copy)]
pub struct DigestHasher {
    algorithm: HashAlgorithm,
}

impl DigestHasher {
    pub fn new(algorithm: HashAlgorithm) -> Result<Self, CryptoError> {
        match algorithm {
            HashAlgorithm::Kmac128 => Err(CryptoError::UnsupportedHash(algorithm)),
            _ => Ok(Self { algorithm }),
        }
    }
}

impl Hasher for DigestHasher {
    fn hash(&self, bytes: &[u8]) -> Vec<u8> {
        match self.algorithm {
            HashAlgorithm::Sha2_256 => sha2::Sha256::digest(bytes).to_vec(),
            HashAlgorithm::Sha2_384 => sha2::Sha384::digest(bytes).to_vec(),
            HashAlgorithm::Sha3_256 => sha3::Sha3_256::digest(bytes).to_vec(),
            HashAlgorithm::Sha3_384 => sha3::Sha3_384::digest(bytes).to_vec(),
            HashAlgorithm::Keccak256 => sha3::Keccak256::digest(bytes).to_vec(),
            // rejected in `new`
            HashAlgorithm::Kmac128 => Vec::new(),
        }
    }
}

/// Hasher for `algorithm`; KMAC128 needs a key and is not offered.
pub fn get_hasher(algorithm: HashAlgorithm) -> Result<DigestHasher, CryptoError> {
    DigestHasher::new(algorithm)
}

/// SHA3-256 digest, used for transaction IDs.
pub fn sha3_256(bytes: &[u8]) -> [u8; 32] {
    sha3::Sha3_256::digest(bytes).into()
}

#[derive(Clone)]
enum SigningKeyInner {
    P256(p256::ecdsa::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
}

#[derive(Clone, PartialEq, Eq)]
enum VerifyingKeyInner {
    P256(p256::ecdsa::VerifyingKey),
    Secp256k1(k256::ecdsa::VerifyingKey),
}

/// Account private key.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKeyInner,
    public_key: PublicKey,
}

impl PrivateKey {
    /// Generate a fresh key from OS randomness.
    pub fn generate(algorithm: SignatureAlgorithm) -> Self {
        let inner = match algorithm {
            SignatureAlgorithm::EcdsaP256 => {
                SigningKeyInner::P256(p256::ecdsa::SigningKey::random(&mut OsRng))
            }
            SignatureAlgorithm::EcdsaSecp256k1 => {
                SigningKeyInner::Secp256k1(k256::ecdsa::SigningKey::random(&mut OsRng))
            }
        };
        Self::from_inner(inner)
    }

    /// Decode a hex scalar (with or without `0x`). Short values are left-padded.
    pub fn from_hex(key_hex: &str, algorithm: SignatureAlgorithm) -> Result<Self, CryptoError> {
        let raw = decode_hex(key_hex)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid private key hex: {}", e)))?;
        let bytes = fixed_scalar(&raw)?;

        let inner = match algorithm {
            SignatureAlgorithm::EcdsaP256 => SigningKeyInner::P256(
                p256::ecdsa::SigningKey::from_slice(&bytes)
                    .map_err(|e| CryptoError::InvalidKey(format!("invalid P-256 scalar: {}", e)))?,
            ),
            SignatureAlgorithm::EcdsaSecp256k1 => SigningKeyInner::Secp256k1(
                k256::ecdsa::SigningKey::from_slice(&bytes)
                    .map_err(|e| CryptoError::InvalidKey(format!("invalid secp256k1 scalar: {}", e)))?,
            ),
        };
        Ok(Self::from_inner(inner))
    }

    /// Load a hex private key from the environment variable `var`.
    pub fn from_env(var: &str, algorithm: SignatureAlgorithm) -> Result<Self, CryptoError> {
        let key_hex = std::env::var(var).map_err(|_| CryptoError::MissingEnv(var.to_string()))?;
        Self::from_hex(&key_hex, algorithm)
    }

    fn from_inner(inner: SigningKeyInner) -> Self {
        let public_key = match &inner {
            SigningKeyInner::P256(key) => PublicKey {
                inner: VerifyingKeyInner::P256(*key.verifying_key()),
            },
            SigningKeyInner::Secp256k1(key) => PublicKey {
                inner: VerifyingKeyInner::Secp256k1(*key.verifying_key()),
            },
        };
        Self { inner, public_key }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.public_key.algorithm()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Hex encoding of the 32-byte scalar. Handle with care.
    pub fn to_hex(&self) -> String {
        match &self.inner {
            SigningKeyInner::P256(key) => hex::encode(key.to_bytes()),
            SigningKeyInner::Secp256k1(key) => hex::encode(key.to_bytes()),
        }
    }

    fn sign_digest(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.inner {
            SigningKeyInner::P256(key) => {
                let signature: p256::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|e| CryptoError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
            SigningKeyInner::Secp256k1(key) => {
                let signature: k256::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|e| CryptoError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("public_key", &self.public_key.to_hex())
            .finish_non_exhaustive()
    }
}

fn fixed_scalar(raw: &[u8]) -> Result<[u8; CURVE_ORDER_SIZE], CryptoError> {
    // Strip sign-padding zeros some encoders emit before the scalar.
    let first_nonzero = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    let significant = &raw[first_nonzero..];
    if significant.len() > CURVE_ORDER_SIZE {
        return Err(CryptoError::InvalidKey(format!(
            "private key is {} bytes, expected at most {}",
            significant.len(),
            CURVE_ORDER_SIZE
        )));
    }
    let mut out = [0u8; CURVE_ORDER_SIZE];
    out[CURVE_ORDER_SIZE - significant.len()..].copy_from_slice(significant);
    Ok(out)
}

/// Account public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKeyInner,
}

impl PublicKey {
    /// Decode the 64-byte `X || Y` hex form used by Flow.
    pub fn from_hex(key_hex: &str, algorithm: SignatureAlgorithm) -> Result<Self, CryptoError> {
        let raw = decode_hex(key_hex)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid public key hex: {}", e)))?;
        Self::from_bytes(&raw, algorithm)
    }

    pub fn from_bytes(raw: &[u8], algorithm: SignatureAlgorithm) -> Result<Self, CryptoError> {
        if raw.len() != 2 * CURVE_ORDER_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "public key is {} bytes, expected {}",
                raw.len(),
                2 * CURVE_ORDER_SIZE
            )));
        }
        let mut sec1 = Vec::with_capacity(raw.len() + 1);
        sec1.push(0x04);
        sec1.extend_from_slice(raw);

        let inner = match algorithm {
            SignatureAlgorithm::EcdsaP256 => VerifyingKeyInner::P256(
                p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map_err(|e| CryptoError::InvalidKey(format!("invalid P-256 point: {}", e)))?,
            ),
            SignatureAlgorithm::EcdsaSecp256k1 => VerifyingKeyInner::Secp256k1(
                k256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map_err(|e| CryptoError::InvalidKey(format!("invalid secp256k1 point: {}", e)))?,
            ),
        };
        Ok(Self { inner })
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self.inner {
            VerifyingKeyInner::P256(_) => SignatureAlgorithm::EcdsaP256,
            VerifyingKeyInner::Secp256k1(_) => SignatureAlgorithm::EcdsaSecp256k1,
        }
    }

    /// Uncompressed point without the SEC1 tag byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.inner {
            VerifyingKeyInner::P256(key) => key.to_encoded_point(false).as_bytes()[1..].to_vec(),
            VerifyingKeyInner::Secp256k1(key) => key.to_encoded_point(false).as_bytes()[1..].to_vec(),
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify an `r || s` signature over `message` hashed with `hash_algo`.
    pub fn verify(
        &self,
        signature: &[u8],
        message: &[u8],
        hash_algo: HashAlgorithm,
    ) -> Result<bool, CryptoError> {
        if hash_algo.output_size() != CURVE_ORDER_SIZE {
            return Err(CryptoError::UnsupportedHash(hash_algo));
        }
        if signature.len() != 2 * CURVE_ORDER_SIZE {
            return Ok(false);
        }
        let digest = get_hasher(hash_algo)?.hash(message);

        let valid = match &self.inner {
            VerifyingKeyInner::P256(key) => p256::ecdsa::Signature::from_slice(signature)
                .map(|sig| key.verify_prehash(&digest, &sig).is_ok())
                .unwrap_or(false),
            VerifyingKeyInner::Secp256k1(key) => k256::ecdsa::Signature::from_slice(signature)
                .map(|sig| key.verify_prehash(&digest, &sig).is_ok())
                .unwrap_or(false),
        };
        Ok(valid)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}, {})", self.algorithm(), self.to_hex())
    }
}

/// A private key together with its public half.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

pub fn generate_key_pair(algorithm: SignatureAlgorithm) -> KeyPair {
    let private_key = PrivateKey::generate(algorithm);
    let public_key = private_key.public_key().clone();
    KeyPair {
        private_key,
        public_key,
    }
}

pub fn decode_private_key(key_hex: &str, algorithm: SignatureAlgorithm) -> Result<PrivateKey, CryptoError> {
    PrivateKey::from_hex(key_hex, algorithm)
}

pub fn decode_public_key(key_hex: &str, algorithm: SignatureAlgorithm) -> Result<PublicKey, CryptoError> {
    PublicKey::from_hex(key_hex, algorithm)
}

/// Produces signatures for transactions and user messages.
pub trait Signer: Send + Sync {
    /// Sign raw bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    fn sign_with_domain(&self, message: &[u8], domain: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut tagged = Vec::with_capacity(domain.len() + message.len());
        tagged.extend_from_slice(domain);
        tagged.extend_from_slice(message);
        self.sign(&tagged)
    }

    fn sign_as_user(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.sign_with_domain(message, &USER_DOMAIN_TAG)
    }

    fn sign_as_transaction(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.sign_with_domain(message, &TRANSACTION_DOMAIN_TAG)
    }
}

/// Signer backed by an in-memory private key.
#[derive(Debug, Clone)]
pub struct KeySigner {
    private_key: PrivateKey,
    hash_algo: HashAlgorithm,
}

impl Signer for KeySigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest = get_hasher(self.hash_algo)?.hash(message);
        self.private_key.sign_digest(&digest)
    }
}

/// Signer for `private_key`, hashing with `hash_algo` (a 256-bit digest).
pub fn get_signer(private_key: &PrivateKey, hash_algo: HashAlgorithm) -> Result<KeySigner, CryptoError> {
    if hash_algo.output_size() != CURVE_ORDER_SIZE || hash_algo == HashAlgorithm::Kmac128 {
        return Err(CryptoError::UnsupportedHash(hash_algo));
    }
    Ok(KeySigner {
        private_key: private_key.clone(),
        hash_algo,
    })
}
