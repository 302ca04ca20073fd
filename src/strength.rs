//! Key strength meter
//!
//! A heuristic score from 0 to 100 based on length and character variety.
//! It says nothing about whether a key is valid for any particular cipher.

use serde::Serialize;
use std::fmt;

/// Coarse strength bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rating {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Weak => f.write_str("Weak"),
            Rating::Medium => f.write_str("Medium"),
            Rating::Strong => f.write_str("Strong"),
            Rating::VeryStrong => f.write_str("Very Strong"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyStrength {
    pub score: u8,
    pub rating: Rating,
}

impl Rating {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => Rating::Weak,
            30..=59 => Rating::Medium,
            60..=79 => Rating::Strong,
            _ => Rating::VeryStrong,
        }
    }
}

/// Score a key string
pub fn assess(key: &str) -> KeyStrength {
    let len = key.chars().count();
    let mut score: u32 = 0;

    if len >= 8 {
        score += 25;
    }
    if len >= 12 {
        score += 25;
    }
    if key.chars().any(char::is_numeric) {
        score += 15;
    }
    if key.chars().any(char::is_uppercase) && key.chars().any(char::is_lowercase) {
        score += 15;
    }
    if key.chars().any(|c| !c.is_alphanumeric()) {
        score += 20;
    }

    let score = score.min(100) as u8;
    KeyStrength {
        score,
        rating: Rating::from_score(score),
    }
}
