//! Cryptographic primitives for mdprov.
//!
//! Two key types can sign data items:
//!
//! - **Arweave** (signature type 1): a 4096-bit RSA key, RSA-PSS over SHA-256.
//!   The owner is the 512-byte modulus. This is the ordinary Arweave wallet,
//!   stored as an RSA JSON Web Key.
//! - **Ed25519** (signature type 2): stored as an OKP JSON Web Key (RFC 8037).
//!
//! Either way the wallet address is `base64url(sha256(owner))`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, Pss, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CoreError, Result};

/// Modulus size of Arweave wallets.
pub const ARWEAVE_KEY_BITS: usize = 4096;
/// Public exponent of Arweave wallets; owners carry only the modulus.
pub const ARWEAVE_PUBLIC_EXPONENT: u32 = 65537;
/// RSA-PSS salt length used when signing.
pub const PSS_SALT_LEN: usize = 32;

/// Compute the SHA-256 digest of data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode bytes as unpadded base64url, the ledger's text form for ids and keys.
pub fn b64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode unpadded base64url.
pub fn b64url_decode(s: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| CoreError::EncodingError(format!("base64url: {e}")))
}

/// ANS-104 signature type. Fixes the signature and owner lengths of a data
/// item and the type string inside its signing hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureType {
    /// RSA-PSS 4096, the standard Arweave wallet.
    Arweave,
    Ed25519,
}

impl SignatureType {
    /// Wire code.
    pub const fn code(self) -> u16 {
        match self {
            SignatureType::Arweave => 1,
            SignatureType::Ed25519 => 2,
        }
    }

    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            1 => Ok(SignatureType::Arweave),
            2 => Ok(SignatureType::Ed25519),
            other => Err(CoreError::UnsupportedSignatureType(other)),
        }
    }

    pub const fn signature_len(self) -> usize {
        match self {
            SignatureType::Arweave => 512,
            SignatureType::Ed25519 => 64,
        }
    }

    pub const fn owner_len(self) -> usize {
        match self {
            SignatureType::Arweave => 512,
            SignatureType::Ed25519 => 32,
        }
    }
}

/// The public half of a signing key: the owner of a signed data item.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Owner {
    kind: SignatureType,
    bytes: Vec<u8>,
}

impl Owner {
    /// Create from raw bytes, checking the length against the key type.
    pub fn new(kind: SignatureType, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != kind.owner_len() {
            return Err(CoreError::InvalidPublicKey);
        }
        Ok(Self { kind, bytes })
    }

    /// An Ed25519 public key.
    pub fn ed25519(bytes: [u8; 32]) -> Self {
        Self {
            kind: SignatureType::Ed25519,
            bytes: bytes.to_vec(),
        }
    }

    pub fn signature_type(&self) -> SignatureType {
        self.kind
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// The wallet address: base64url(sha256(owner)).
    pub fn address(&self) -> String {
        b64url_encode(&sha256(&self.bytes))
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        match self.kind {
            SignatureType::Ed25519 => {
                let key: [u8; 32] = self
                    .bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| CoreError::InvalidPublicKey)?;
                let sig: [u8; 64] = signature
                    .as_bytes()
                    .try_into()
                    .map_err(|_| CoreError::InvalidSignature)?;
                let verifying_key =
                    VerifyingKey::from_bytes(&key).map_err(|_| CoreError::InvalidPublicKey)?;
                verifying_key
                    .verify(message, &DalekSignature::from_bytes(&sig))
                    .map_err(|_| CoreError::InvalidSignature)
            }
            SignatureType::Arweave => {
                let public = RsaPublicKey::new(
                    BigUint::from_bytes_be(&self.bytes),
                    BigUint::from(ARWEAVE_PUBLIC_EXPONENT),
                )
                .map_err(|_| CoreError::InvalidPublicKey)?;
                public
                    .verify(
                        Pss::new_with_salt::<Sha256>(PSS_SALT_LEN),
                        &sha256(message),
                        signature.as_bytes(),
                    )
                    .map_err(|_| CoreError::InvalidSignature)
            }
        }
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Owner({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Owner {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// A data item signature: 64 bytes for Ed25519, 512 for Arweave.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "Sig({}...)", &hex[..hex.len().min(8)])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A signing key in JSON Web Key form, selected by `kty`.
///
/// Unknown members (`ext`, `alg`, ...) are ignored.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum Jwk {
    /// An Arweave wallet. All members are base64url big-endian integers.
    #[serde(rename = "RSA")]
    Rsa {
        n: String,
        e: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        d: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        p: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        q: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dp: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dq: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qi: Option<String>,
    },
    #[serde(rename = "OKP")]
    Okp {
        crv: String,
        /// Public key, base64url.
        x: String,
        /// Private seed, base64url. Absent for public-only keys.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        d: Option<String>,
    },
}

impl Jwk {
    /// Whether the private part is present.
    pub fn has_private(&self) -> bool {
        match self {
            Jwk::Rsa { d, .. } | Jwk::Okp { d, .. } => d.is_some(),
        }
    }

    /// The same key without any private members.
    pub fn public_only(&self) -> Jwk {
        match self.clone() {
            Jwk::Rsa { n, e, .. } => Jwk::Rsa {
                n,
                e,
                d: None,
                p: None,
                q: None,
                dp: None,
                dq: None,
                qi: None,
            },
            Jwk::Okp { crv, x, .. } => Jwk::Okp { crv, x, d: None },
        }
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = self.has_private().then_some("[REDACTED]");
        match self {
            Jwk::Rsa { n, e, .. } => f
                .debug_struct("Jwk::Rsa")
                .field("n", &format_args!("{}...", &n[..n.len().min(12)]))
                .field("e", e)
                .field("private", &redacted)
                .finish(),
            Jwk::Okp { crv, x, .. } => f
                .debug_struct("Jwk::Okp")
                .field("crv", crv)
                .field("x", x)
                .field("d", &redacted)
                .finish(),
        }
    }
}

#[derive(Clone)]
enum KeyMaterial {
    Ed25519(SigningKey),
    Rsa(Box<RsaPrivateKey>),
}

/// A keypair for signing data items.
///
/// `Debug` shows only the owner.
#[derive(Clone)]
pub struct Keypair {
    key: KeyMaterial,
    owner: Owner,
}

impl Keypair {
    /// Generate a new random Ed25519 keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_signing_key(SigningKey::generate(&mut rng))
    }

    /// Generate a new Arweave wallet (RSA 4096). Takes a few seconds.
    pub fn generate_arweave() -> Result<Self> {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, ARWEAVE_KEY_BITS)
            .map_err(|e| CoreError::InvalidKey(format!("key generation failed: {e}")))?;
        Self::from_rsa(key)
    }

    /// Create an Ed25519 keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let owner = Owner::ed25519(signing_key.verifying_key().to_bytes());
        Self {
            key: KeyMaterial::Ed25519(signing_key),
            owner,
        }
    }

    /// Wrap an RSA private key. Only 4096-bit keys with the standard public
    /// exponent are valid Arweave wallets.
    pub fn from_rsa(key: RsaPrivateKey) -> Result<Self> {
        if key.e() != &BigUint::from(ARWEAVE_PUBLIC_EXPONENT) {
            return Err(CoreError::InvalidKey(format!(
                "public exponent must be {ARWEAVE_PUBLIC_EXPONENT}"
            )));
        }
        let owner = Owner::new(SignatureType::Arweave, key.n().to_bytes_be()).map_err(|_| {
            CoreError::InvalidKey(format!("RSA modulus must be {ARWEAVE_KEY_BITS} bits"))
        })?;
        Ok(Self {
            key: KeyMaterial::Rsa(Box::new(key)),
            owner,
        })
    }

    pub fn signature_type(&self) -> SignatureType {
        self.owner.signature_type()
    }

    /// Get the public key (owner).
    pub fn owner(&self) -> Owner {
        self.owner.clone()
    }

    /// Sign a message.
    ///
    /// Ed25519 signatures are deterministic. RSA-PSS signatures are salted,
    /// so each call returns different bytes that all verify.
    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        match &self.key {
            KeyMaterial::Ed25519(key) => Ok(Signature(key.sign(message).to_bytes().to_vec())),
            KeyMaterial::Rsa(key) => {
                let mut rng = rand::thread_rng();
                let sig = key
                    .sign_with_rng(
                        &mut rng,
                        Pss::new_with_salt::<Sha256>(PSS_SALT_LEN),
                        &sha256(message),
                    )
                    .map_err(|e| CoreError::SigningFailed(e.to_string()))?;
                Ok(Signature(sig))
            }
        }
    }

    /// Load from a JWK.
    ///
    /// Rejects keys without a private part, unsupported curves and sizes, and
    /// keys whose public members do not match the private ones.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        match jwk {
            Jwk::Okp { crv, x, d } => {
                if crv != "Ed25519" {
                    return Err(CoreError::InvalidKey(format!(
                        "expected curve Ed25519, found {crv}"
                    )));
                }
                let seed: [u8; 32] = b64url_decode(private(d.as_deref())?)?
                    .try_into()
                    .map_err(|_| {
                        CoreError::InvalidKey("private component must be 32 bytes".into())
                    })?;

                let keypair = Self::from_seed(&seed);
                if b64url_decode(x)?.as_slice() != keypair.owner.as_bytes() {
                    return Err(CoreError::InvalidKey(
                        "public component does not match private component".into(),
                    ));
                }
                Ok(keypair)
            }
            Jwk::Rsa { n, e, d, p, q, .. } => {
                let int = |s: &str| b64url_decode(s).map(|b| BigUint::from_bytes_be(&b));
                let d = int(private(d.as_deref())?)?;
                let (Some(p), Some(q)) = (p.as_deref(), q.as_deref()) else {
                    return Err(CoreError::InvalidKey("RSA key has no prime factors".into()));
                };
                let key = RsaPrivateKey::from_components(int(n)?, int(e)?, d, vec![int(p)?, int(q)?])
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                key.validate()
                    .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
                Self::from_rsa(key)
            }
        }
    }

    /// Parse from JWK JSON text.
    pub fn from_jwk_json(json: &str) -> Result<Self> {
        let jwk: Jwk =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        Self::from_jwk(&jwk)
    }

    /// Export as a JWK including the private part.
    pub fn to_jwk(&self) -> Jwk {
        match &self.key {
            KeyMaterial::Ed25519(key) => Jwk::Okp {
                crv: "Ed25519".into(),
                x: b64url_encode(self.owner.as_bytes()),
                d: Some(b64url_encode(&key.to_bytes())),
            },
            KeyMaterial::Rsa(key) => {
                let int = |v: &BigUint| b64url_encode(&v.to_bytes_be());
                let one = BigUint::from(1u32);
                let two = BigUint::from(2u32);
                let d = key.d();
                let primes = match key.primes() {
                    [p, q] => Some((p, q)),
                    _ => None,
                };
                Jwk::Rsa {
                    n: int(key.n()),
                    e: int(key.e()),
                    d: Some(int(d)),
                    p: primes.map(|(p, _)| int(p)),
                    q: primes.map(|(_, q)| int(q)),
                    dp: primes.map(|(p, _)| int(&(d % (p - &one)))),
                    dq: primes.map(|(_, q)| int(&(d % (q - &one)))),
                    // q^-1 mod p, by Fermat since p is prime.
                    qi: primes.map(|(p, q)| int(&q.modpow(&(p - &two), p))),
                }
            }
        }
    }
}

fn private(d: Option<&str>) -> Result<&str> {
    d.ok_or_else(|| CoreError::InvalidKey("key has no private component".into()))
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.owner)
    }
}
