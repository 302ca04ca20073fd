//! Classical shift and mapping ciphers
//!
//! Caesar, ROT13, Substitution and Vigenère all map one letter to one letter,
//! differing only in how the per-letter shift is derived from the key.
//! Case is preserved and non-letters pass through unchanged.

pub mod caesar;
pub mod rot13;
pub mod substitution;
pub mod vigenere;
