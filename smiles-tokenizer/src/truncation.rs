use displaydoc::Display;
use log::warn;
use thiserror::Error;

use crate::{encoding::Encoding, post_tokenizer::PostTokenizer};

/// A truncation strategy.
///
/// Defaults to the [`none()`] truncation strategy.
///
/// [`none()`]: Truncation::none
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Truncation(Truncations);

/// The truncation strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Truncations {
    /// No truncation.
    None,
    /// Truncation to a fixed length.
    Fixed { len: usize },
}

/// The potential errors of the truncation.
#[derive(Debug, Display, Error)]
pub enum TruncationError {
    /// The maximum sequence length must be at least {min} to keep the boundary tokens, got {len}
    Length { min: usize, len: usize },
}

impl Default for Truncation {
    fn default() -> Self {
        Self::none()
    }
}

impl Truncation {
    /// Creates an inert truncation strategy.
    pub fn none() -> Self {
        Self(Truncations::None)
    }

    /// Creates a fixed-length truncation strategy.
    ///
    /// The length must be greater or equal to the number of boundary tokens added by the
    /// [`PostTokenizer`] to single sequences.
    pub fn fixed(len: usize) -> Self {
        Self(Truncations::Fixed { len })
    }

    /// Gets the maximum sequence length, if any.
    pub fn max_len(&self) -> Option<usize> {
        match self.0 {
            Truncations::None => None,
            Truncations::Fixed { len } => Some(len),
        }
    }

    /// Validates itself.
    pub fn validate(self) -> Result<Self, TruncationError> {
        match self.0 {
            Truncations::Fixed { len } if len < PostTokenizer::ADDED_TOKENS => {
                Err(TruncationError::Length {
                    min: PostTokenizer::ADDED_TOKENS,
                    len,
                })
            }
            _ => Ok(self),
        }
    }

    /// Truncates the encoding.
    ///
    /// Sequences longer than the maximum length keep their leading positions and lose the rest,
    /// including a trailing end token. Every clipped batch is reported as a warning.
    pub fn truncate(&self, encoding: Encoding) -> Encoding {
        match self.0 {
            Truncations::None => encoding,
            Truncations::Fixed { len } => {
                let longest = encoding.max_len();
                if longest > len {
                    warn!(
                        "Sequence length {} is larger than the maximum sequence length {}, truncating.",
                        longest, len,
                    );
                    encoding.truncate(len)
                } else {
                    encoding
                }
            }
        }
    }
}
