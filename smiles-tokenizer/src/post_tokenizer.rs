use std::iter::{once, repeat};

use displaydoc::Display;
use thiserror::Error;

use crate::{vocab::SpecialTokens, Token};

/// A post-tokenizer.
///
/// Wraps single sequences as `begin + first + end` and paired sequences as
/// `begin + first + sep + second + end`.
#[derive(Clone, Debug)]
pub struct PostTokenizer {
    begin: Token,
    end: Token,
    sep: Token,
}

/// The potential errors of the post-tokenizer.
#[derive(Debug, Display, Error)]
pub enum PostTokenizerError {
    /// The paired batches differ in length: {first} != {second}
    LengthMismatch { first: usize, second: usize },
}

impl PostTokenizer {
    /// The number of boundary tokens added to single sequences.
    pub(crate) const ADDED_TOKENS: usize = 2;

    /// Creates a post-tokenizer from the boundary tokens.
    pub fn new(special: &SpecialTokens) -> Self {
        Self {
            begin: special.begin.clone(),
            end: special.end.clone(),
            sep: special.sep.clone(),
        }
    }

    /// Assembles the sequences and their segment masks.
    ///
    /// The segment mask is `0` for every position up to and including the separator and `1` for
    /// the remaining positions of the second sequence including the end token. Single sequences
    /// are entirely `0`.
    ///
    /// # Errors
    /// Fails if the paired batches differ in length.
    pub fn assemble(
        &self,
        first: Vec<Vec<Token>>,
        second: Option<Vec<Vec<Token>>>,
    ) -> Result<(Vec<Vec<Token>>, Vec<Vec<u8>>), PostTokenizerError> {
        let second = if let Some(second) = second {
            second
        } else {
            return Ok(first
                .into_iter()
                .map(|sequence| {
                    let len = sequence.len() + Self::ADDED_TOKENS;
                    let sequence: Vec<Token> = once(self.begin.clone())
                        .chain(sequence)
                        .chain(once(self.end.clone()))
                        .collect();
                    (sequence, vec![0_u8; len])
                })
                .unzip());
        };

        if first.len() != second.len() {
            return Err(PostTokenizerError::LengthMismatch {
                first: first.len(),
                second: second.len(),
            });
        }

        Ok(first
            .into_iter()
            .zip(second)
            .map(|(first, second)| {
                // begin + first + sep
                let first_len = first.len() + 2;
                // second + end
                let second_len = second.len() + 1;
                let sequence: Vec<Token> = once(self.begin.clone())
                    .chain(first)
                    .chain(once(self.sep.clone()))
                    .chain(second)
                    .chain(once(self.end.clone()))
                    .collect();
                let segments: Vec<u8> = repeat(0)
                    .take(first_len)
                    .chain(repeat(1).take(second_len))
                    .collect();
                (sequence, segments)
            })
            .unzip())
    }
}
