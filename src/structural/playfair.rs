//! Playfair digraph cipher
//!
//! The key square is built from the deduplicated key (J folded into I)
//! followed by the rest of the alphabet without J, laid out row-major.

use crate::alphabet::{letter_indices, parse_letter_key};
use crate::error::{Error, Result};

const NAME: &str = "Playfair Cipher";

/// Side of the key square
pub const SQUARE_SIZE: usize = 5;

const I: u8 = 8;
const J: u8 = 9;
const X: u8 = 23;

/// 5×5 Playfair key square
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySquare {
    /// Alphabet indices in row-major order
    cells: [u8; SQUARE_SIZE * SQUARE_SIZE],
    /// Cell position of each letter (J shares I's slot)
    positions: [usize; 26],
}

fn fold_j(idx: u8) -> u8 {
    if idx == J {
        I
    } else {
        idx
    }
}

impl KeySquare {
    /// Build the key square from a non-empty alphabetic key
    pub fn new(key: Option<&str>) -> Result<Self> {
        let key = parse_letter_key(key, NAME)?;

        let mut cells = [0u8; SQUARE_SIZE * SQUARE_SIZE];
        let mut positions = [usize::MAX; 26];
        let mut filled = 0;

        let rest = (0..26u8).filter(|&c| c != J);
        for letter in key.into_iter().map(fold_j).chain(rest) {
            if positions[letter as usize] == usize::MAX {
                positions[letter as usize] = filled;
                cells[filled] = letter;
                filled += 1;
            }
        }
        positions[J as usize] = positions[I as usize];

        Ok(KeySquare { cells, positions })
    }

    /// Row and column of a letter
    fn locate(&self, letter: u8) -> (usize, usize) {
        let pos = self.positions[letter as usize];
        (pos / SQUARE_SIZE, pos % SQUARE_SIZE)
    }

    fn at(&self, row: usize, col: usize) -> u8 {
        self.cells[row * SQUARE_SIZE + col]
    }

    /// Transform one digraph; `step` is +1 to encrypt and `SQUARE_SIZE - 1` to decrypt
    fn digraph(&self, a: u8, b: u8, step: usize) -> (u8, u8) {
        let (r1, c1) = self.locate(a);
        let (r2, c2) = self.locate(b);

        if r1 == r2 {
            (
                self.at(r1, (c1 + step) % SQUARE_SIZE),
                self.at(r2, (c2 + step) % SQUARE_SIZE),
            )
        } else if c1 == c2 {
            (
                self.at((r1 + step) % SQUARE_SIZE, c1),
                self.at((r2 + step) % SQUARE_SIZE, c2),
            )
        } else {
            (self.at(r1, c2), self.at(r2, c1))
        }
    }

    /// The square as five strings of five letters
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(SQUARE_SIZE)
            .map(|row| row.iter().map(|&c| (b'A' + c) as char).collect())
            .collect()
    }
}

/// Strip non-letters, fold J→I and split into digraphs.
///
/// An `X` is inserted between equal letters that would share a digraph and
/// appended when one letter is left over.
pub fn prepare_plaintext(text: &str) -> Vec<(u8, u8)> {
    let letters: Vec<u8> = letter_indices(text).into_iter().map(fold_j).collect();
    let mut pairs = Vec::with_capacity(letters.len() / 2 + 1);

    let mut i = 0;
    while i < letters.len() {
        let a = letters[i];
        match letters.get(i + 1) {
            Some(&b) if b != a => {
                pairs.push((a, b));
                i += 2;
            }
            _ => {
                pairs.push((a, X));
                i += 1;
            }
        }
    }

    pairs
}

fn render(pairs: impl Iterator<Item = (u8, u8)>) -> String {
    pairs
        .flat_map(|(a, b)| [(b'A' + a) as char, (b'A' + b) as char])
        .collect()
}

pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    let square = KeySquare::new(key)?;
    let pairs = prepare_plaintext(text);
    Ok(render(pairs.into_iter().map(|(a, b)| square.digraph(a, b, 1))))
}

pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    let square = KeySquare::new(key)?;
    let letters: Vec<u8> = letter_indices(text).into_iter().map(fold_j).collect();

    if letters.len() % 2 != 0 {
        return Err(Error::InvalidInput(format!(
            "{} ciphertext must contain an even number of letters, got {}",
            NAME,
            letters.len()
        )));
    }

    Ok(render(
        letters
            .chunks(2)
            .map(|pair| square.digraph(pair[0], pair[1], SQUARE_SIZE - 1)),
    ))
}
