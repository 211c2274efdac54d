use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::matrix::PieceMatrix;

/// Rotation state of a piece, in clockwise quarter turns.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Rotation wraps around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    #[must_use]
    pub const fn rotated_clockwise(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }
}

/// The fixed catalog of piece shapes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
#[repr(u8)]
pub enum ShapeKind {
    /// Straight bar, authored vertically.
    I,
    /// 2 × 2 square.
    O,
    T,
    L,
    J,
    S,
    Z,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown piece type {input:?}")]
pub struct ShapeParseError {
    input: String,
}

impl ShapeKind {
    /// Number of shapes in the catalog.
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::T,
        Self::L,
        Self::J,
        Self::S,
        Self::Z,
    ];

    /// Base shapes, top row first. `'#'` is filled.
    const BASE_SHAPES: [&'static [&'static str]; Self::LEN] = [
        &["#", "#", "#", "#"],
        &["##", "##"],
        &["###", " #"],
        &["#", "#", "##"],
        &[" #", " #", "##"],
        &[" ##", "##"],
        &["##", " ##"],
    ];

    /// Text rows of the shape at rotation 0.
    #[must_use]
    pub const fn base_rows(self) -> &'static [&'static str] {
        Self::BASE_SHAPES[self as usize]
    }

    /// Matrix of the shape at rotation 0.
    #[must_use]
    pub fn base_matrix(self) -> PieceMatrix {
        PieceMatrix::parse(self.base_rows())
    }

    /// Matrix of the shape at `rotation`.
    #[must_use]
    pub fn matrix(self, rotation: PieceRotation) -> PieceMatrix {
        self.base_matrix()
            .rotated_clockwise_times(usize::from(rotation.quarter_turns()))
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::O => 'O',
            Self::T => 'T',
            Self::L => 'L',
            Self::J => 'J',
            Self::S => 'S',
            Self::Z => 'Z',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Self::I),
            'O' => Some(Self::O),
            'T' => Some(Self::T),
            'L' => Some(Self::L),
            'J' => Some(Self::J),
            'S' => Some(Self::S),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }
}

impl FromStr for ShapeKind {
    type Err = ShapeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c.to_ascii_uppercase()),
            _ => None,
        }
        .ok_or_else(|| ShapeParseError {
            input: s.to_owned(),
        })
    }
}
