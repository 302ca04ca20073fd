//! Algorithm selection and dispatch
//!
//! [`Algorithm`] is a closed enum with one variant per cipher. Callers parse it
//! from a name or slug, query its [`AlgorithmDescriptor`] for key
//! requirements, and call [`Algorithm::encrypt`] / [`Algorithm::decrypt`].

use crate::classical::{caesar, rot13, substitution, vigenere};
use crate::crypto::{self, AesMode, OutputFormat};
use crate::error::{Error, Result};
use crate::positional::{chris_way_v1, chris_way_v2};
use crate::rsa;
use crate::structural::{hill, playfair, rail_fence, row_transposition};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Cipher variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Caesar,
    Rot13,
    Playfair,
    RailFence,
    RowTransposition,
    Hill,
    Substitution,
    Vigenere,
    ChrisWayV1,
    ChrisWayV2,
    Aes,
    Rsa,
}

/// Direction of a cipher call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encrypt => f.write_str("encrypt"),
            Operation::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Static description of an algorithm's key contract
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmDescriptor {
    pub name: &'static str,
    pub slug: &'static str,
    pub key_required: bool,
    pub format_hint: &'static str,
    pub operations: &'static [Operation],
}

const BOTH: &[Operation] = &[Operation::Encrypt, Operation::Decrypt];

static DESCRIPTORS: [AlgorithmDescriptor; 12] = [
    AlgorithmDescriptor {
        name: "Caesar Cipher",
        slug: "caesar",
        key_required: true,
        format_hint: "Integer from 1 to 25",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "ROT13",
        slug: "rot13",
        key_required: false,
        format_hint: "No key; fixed shift of 13",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "Playfair Cipher",
        slug: "playfair",
        key_required: true,
        format_hint: "Letters only; builds a 5x5 square with I/J combined",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "Rail Fence",
        slug: "rail-fence",
        key_required: true,
        format_hint: "Integer of at least 2 (number of rails)",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "Row Transposition",
        slug: "row-transposition",
        key_required: true,
        format_hint: "Space-separated distinct numbers, e.g. '3 1 2'",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "Hill Cipher",
        slug: "hill",
        key_required: true,
        format_hint: "Comma-separated integers forming an invertible square matrix, e.g. '5,8,17,3'",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "Substitution Cipher",
        slug: "substitution",
        key_required: true,
        format_hint: "All 26 letters, each exactly once",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "Vigenère Cipher",
        slug: "vigenere",
        key_required: true,
        format_hint: "Letters only",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "Chris Way Cipher V1",
        slug: "chris-way-v1",
        key_required: false,
        format_hint: "No key; shifts depend on character positions",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "Chris Way Cipher V2",
        slug: "chris-way-v2",
        key_required: true,
        format_hint: "Letters only, at least 3; decrypt with the same key used to encrypt",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "AES",
        slug: "aes",
        key_required: true,
        format_hint: "16/24/32 characters, or 32/48/64 hex digits (optional '0x' prefix)",
        operations: BOTH,
    },
    AlgorithmDescriptor {
        name: "RSA",
        slug: "rsa",
        key_required: true,
        format_hint: "'e,n' to encrypt or 'd,n' to decrypt, in decimal",
        operations: BOTH,
    },
];

/// Every algorithm, in descriptor order
pub const ALL_ALGORITHMS: [Algorithm; 12] = [
    Algorithm::Caesar,
    Algorithm::Rot13,
    Algorithm::Playfair,
    Algorithm::RailFence,
    Algorithm::RowTransposition,
    Algorithm::Hill,
    Algorithm::Substitution,
    Algorithm::Vigenere,
    Algorithm::ChrisWayV1,
    Algorithm::ChrisWayV2,
    Algorithm::Aes,
    Algorithm::Rsa,
];

/// The static descriptor table
pub fn descriptors() -> &'static [AlgorithmDescriptor] {
    &DESCRIPTORS
}

/// Options that only some algorithms honour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherOptions {
    /// AES mode of operation
    pub aes_mode: AesMode,
    /// AES envelope encoding
    pub output_format: OutputFormat,
}

impl Algorithm {
    pub fn descriptor(&self) -> &'static AlgorithmDescriptor {
        let index = match self {
            Algorithm::Caesar => 0,
            Algorithm::Rot13 => 1,
            Algorithm::Playfair => 2,
            Algorithm::RailFence => 3,
            Algorithm::RowTransposition => 4,
            Algorithm::Hill => 5,
            Algorithm::Substitution => 6,
            Algorithm::Vigenere => 7,
            Algorithm::ChrisWayV1 => 8,
            Algorithm::ChrisWayV2 => 9,
            Algorithm::Aes => 10,
            Algorithm::Rsa => 11,
        };
        &DESCRIPTORS[index]
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    pub fn slug(&self) -> &'static str {
        self.descriptor().slug
    }

    pub fn key_required(&self) -> bool {
        self.descriptor().key_required
    }

    /// Encrypt with default options
    pub fn encrypt(&self, text: &str, key: Option<&str>) -> Result<String> {
        self.encrypt_with(text, key, &CipherOptions::default())
    }

    /// Decrypt; the AES envelope carries its own mode and encoding
    pub fn decrypt(&self, text: &str, key: Option<&str>) -> Result<String> {
        self.run(Operation::Decrypt, text, key, &CipherOptions::default())
    }

    pub fn encrypt_with(
        &self,
        text: &str,
        key: Option<&str>,
        options: &CipherOptions,
    ) -> Result<String> {
        self.run(Operation::Encrypt, text, key, options)
    }

    /// Run one cipher call. An empty key string counts as no key.
    pub fn run(
        &self,
        operation: Operation,
        text: &str,
        key: Option<&str>,
        options: &CipherOptions,
    ) -> Result<String> {
        let key = key.filter(|k| !k.is_empty());
        debug!(
            "{} {} of {} characters",
            self.name(),
            operation,
            text.chars().count()
        );

        match operation {
            Operation::Encrypt => match self {
                Algorithm::Caesar => caesar::encrypt(text, key),
                Algorithm::Rot13 => rot13::encrypt(text, key),
                Algorithm::Playfair => playfair::encrypt(text, key),
                Algorithm::RailFence => rail_fence::encrypt(text, key),
                Algorithm::RowTransposition => row_transposition::encrypt(text, key),
                Algorithm::Hill => hill::encrypt(text, key),
                Algorithm::Substitution => substitution::encrypt(text, key),
                Algorithm::Vigenere => vigenere::encrypt(text, key),
                Algorithm::ChrisWayV1 => chris_way_v1::encrypt(text, key),
                Algorithm::ChrisWayV2 => chris_way_v2::encrypt(text, key),
                Algorithm::Aes => {
                    crypto::encrypt(text, key, options.aes_mode, options.output_format)
                }
                Algorithm::Rsa => rsa::encrypt(text, key),
            },
            Operation::Decrypt => match self {
                Algorithm::Caesar => caesar::decrypt(text, key),
                Algorithm::Rot13 => rot13::decrypt(text, key),
                Algorithm::Playfair => playfair::decrypt(text, key),
                Algorithm::RailFence => rail_fence::decrypt(text, key),
                Algorithm::RowTransposition => row_transposition::decrypt(text, key),
                Algorithm::Hill => hill::decrypt(text, key),
                Algorithm::Substitution => substitution::decrypt(text, key),
                Algorithm::Vigenere => vigenere::decrypt(text, key),
                Algorithm::ChrisWayV1 => chris_way_v1::decrypt(text, key),
                Algorithm::ChrisWayV2 => chris_way_v2::decrypt(text, key),
                Algorithm::Aes => crypto::decrypt(text, key),
                Algorithm::Rsa => rsa::decrypt(text, key),
            },
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Accepts slugs (`rail-fence`) and display names (`Rail Fence`,
    /// `Vigenère Cipher`), case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(['_', ' '], "-")
            .replace('è', "e")
            .replace("-cipher", "");

        ALL_ALGORITHMS
            .iter()
            .copied()
            .find(|a| a.slug() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown algorithm '{}'", s)))
    }
}
