//! Structural ciphers
//!
//! Playfair works on digraphs through a 5×5 key square, Rail Fence and Row
//! Transposition permute character positions, and Hill multiplies letter
//! blocks by a key matrix mod 26.

pub mod hill;
pub mod playfair;
pub mod rail_fence;
pub mod row_transposition;
