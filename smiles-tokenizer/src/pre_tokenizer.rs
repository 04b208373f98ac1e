use displaydoc::Display;
use regex::Regex;
use thiserror::Error;

use crate::Token;

/// The default SMILES pattern.
///
/// The branches are ordered from most to least specific:
/// - Bracket atoms: `[C@@H]`, `[nH]`, `[O-]`, etc.
/// - Two-letter halogens: `Br`, `Cl` (before `B`, `C`).
/// - Single-letter organic subset atoms, aliphatic and aromatic.
/// - Two-digit ring bonds: `%10`, `%12`, etc.
/// - Bonds, branches, stereo markers and the remaining symbols.
/// - Single-digit ring bonds.
pub const SMILES_PATTERN: &str = r"\[[^\]]+\]|Br?|Cl?|N|O|S|P|F|I|b|c|n|o|s|p|%[0-9]{2}|\(|\)|\.|=|#|-|\+|\\|/|:|~|@|\?|>|\*|\$|[0-9]";

/// A regex pre-tokenizer.
///
/// Splits a SMILES string into the ordered matches of the pattern, which must cover the whole
/// string without gaps.
#[derive(Clone, Debug)]
pub struct PreTokenizer {
    regex: Regex,
}

/// The potential errors of the pre-tokenizer.
#[derive(Debug, Display, Error)]
pub enum PreTokenizerError {
    /// Invalid pre-tokenizer pattern: {0}
    Pattern(#[from] regex::Error),
    /// Malformed SMILES string `{smiles}`: no token matches at byte {position}
    Malformed { smiles: String, position: usize },
}

impl PreTokenizer {
    /// Creates a pre-tokenizer from a regex pattern.
    pub fn new(pattern: &str) -> Result<Self, PreTokenizerError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Gets the pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Splits the SMILES string into tokens.
    ///
    /// # Errors
    /// Fails if any part of the string isn't matched by the pattern.
    pub fn pre_tokenize(&self, smiles: &str) -> Result<Vec<Token>, PreTokenizerError> {
        let mut tokens = Vec::new();
        let mut position = 0;

        for token in self.regex.find_iter(smiles) {
            if token.start() == token.end() {
                continue;
            }
            if token.start() != position {
                break;
            }
            tokens.push(token.as_str().into());
            position = token.end();
        }

        if position == smiles.len() {
            Ok(tokens)
        } else {
            Err(PreTokenizerError::Malformed {
                smiles: smiles.to_string(),
                position,
            })
        }
    }

    /// Splits the batch of SMILES strings into tokens.
    ///
    /// # Errors
    /// Fails on the first malformed string, no partial batch is returned.
    pub fn pre_tokenize_batch(
        &self,
        batch: &[impl AsRef<str>],
    ) -> Result<Vec<Vec<Token>>, PreTokenizerError> {
        batch
            .iter()
            .map(|smiles| self.pre_tokenize(smiles.as_ref()))
            .collect()
    }
}
