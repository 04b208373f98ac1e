use std::{
    collections::HashMap,
    io::{BufRead, Error as IoError, Write},
    ops::Range,
};

use displaydoc::Display;
use log::debug;
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    pre_tokenizer::{PreTokenizer, PreTokenizerError},
    Token,
};

/// The number of special tokens, which are reserved at the lowest ids.
pub const SPECIAL_TOKENS: usize = 6;

/// The special tokens.
///
/// Their ids are fixed to `0..6` in the order pad, unknown, begin, end, mask and separator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTokens {
    pub pad: Token,
    pub unk: Token,
    pub begin: Token,
    pub end: Token,
    pub mask: Token,
    pub sep: Token,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            pad: "<PAD>".into(),
            unk: "?".into(),
            begin: "^".into(),
            end: "&".into(),
            mask: "<MASK>".into(),
            sep: "<SEP>".into(),
        }
    }
}

impl SpecialTokens {
    /// Iterates over the special tokens in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        IntoIterator::into_iter([
            &self.pad,
            &self.unk,
            &self.begin,
            &self.end,
            &self.mask,
            &self.sep,
        ])
    }

    /// Checks whether the token marks a sequence boundary.
    pub(crate) fn is_boundary(&self, token: &str) -> bool {
        token == self.begin.as_str() || token == self.end.as_str() || token == self.sep.as_str()
    }
}

/// The potential errors of the vocabulary.
#[derive(Debug, Display, Error)]
pub enum VocabError {
    /// Failed to read or write the vocabulary: {0}
    Io(#[from] IoError),
    /// Failed to split the corpus: {0}
    PreTokenizer(#[from] PreTokenizerError),
    /// Expected the special token `{expected}` at id {id}, found `{found}`
    SpecialToken {
        id: usize,
        expected: Token,
        found: Token,
    },
    /// The token `{0}` occurs more than once
    DuplicateToken(Token),
    /// The vocabulary contains an empty token at id {0}
    EmptyToken(usize),
    /// The chemical tokens must start after the special tokens and at most at {len}, got {start}
    ChemTokenStart { start: usize, len: usize },
    /// The id {0} overflows the id type
    IdOverflow(usize),
}

/// A vocabulary.
///
/// A bijection between tokens and dense, zero-based ids.
#[derive(Debug)]
pub struct Vocab<N> {
    ids: HashMap<Token, N>,
    tokens: Vec<Token>,
    special: SpecialTokens,
    special_ids: [N; SPECIAL_TOKENS],
    chem_start: usize,
}

impl<N> Vocab<N>
where
    N: FromPrimitive + Copy,
{
    /// Creates a vocabulary which only contains the special tokens.
    fn with_special_tokens(special: SpecialTokens) -> Result<Self, VocabError> {
        let id = |idx: usize| N::from_usize(idx).ok_or(VocabError::IdOverflow(idx));
        let special_ids = [id(0)?, id(1)?, id(2)?, id(3)?, id(4)?, id(5)?];
        let mut vocab = Self {
            ids: HashMap::new(),
            tokens: Vec::new(),
            special: special.clone(),
            special_ids,
            chem_start: SPECIAL_TOKENS,
        };
        for token in special.iter() {
            if !vocab.insert(token.clone())? {
                return Err(VocabError::DuplicateToken(token.clone()));
            }
        }

        Ok(vocab)
    }

    /// Assigns the next free id to the token if it is new.
    fn insert(&mut self, token: Token) -> Result<bool, VocabError> {
        if self.ids.contains_key(token.as_str()) {
            return Ok(false);
        }
        let idx = self.tokens.len();
        let id = N::from_usize(idx).ok_or(VocabError::IdOverflow(idx))?;
        self.ids.insert(token.clone(), id);
        self.tokens.push(token);

        Ok(true)
    }

    /// Builds a vocabulary from a corpus of SMILES strings.
    ///
    /// The special tokens are seeded first, then every other token is assigned the next free id
    /// in the order it is first seen while scanning the corpus.
    pub fn from_corpus(
        corpus: &[impl AsRef<str>],
        pre_tokenizer: &PreTokenizer,
        special: SpecialTokens,
    ) -> Result<Self, VocabError> {
        let mut vocab = Self::with_special_tokens(special)?;
        for smiles in corpus {
            for token in pre_tokenizer.pre_tokenize(smiles.as_ref())? {
                vocab.insert(token)?;
            }
        }
        debug!(
            "Built vocabulary of {} tokens from {} sequences.",
            vocab.len(),
            corpus.len(),
        );

        Ok(vocab)
    }

    /// Creates a vocabulary from tokens ordered by their ids.
    ///
    /// The tokens must start with the special tokens in their fixed order. Chemical tokens start
    /// at `chem_start`, which defaults to the first id after the special tokens.
    pub fn from_tokens(
        tokens: Vec<Token>,
        special: SpecialTokens,
        chem_start: Option<usize>,
    ) -> Result<Self, VocabError> {
        for (id, (expected, found)) in special.iter().zip(tokens.iter()).enumerate() {
            if expected != found {
                return Err(VocabError::SpecialToken {
                    id,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
        if let Some((id, expected)) = special.iter().enumerate().nth(tokens.len()) {
            return Err(VocabError::SpecialToken {
                id,
                expected: expected.clone(),
                found: Token::new(),
            });
        }

        let mut vocab = Self::with_special_tokens(special)?;
        for (id, token) in tokens.into_iter().enumerate().skip(SPECIAL_TOKENS) {
            if token.is_empty() {
                return Err(VocabError::EmptyToken(id));
            }
            if !vocab.insert(token.clone())? {
                return Err(VocabError::DuplicateToken(token));
            }
        }

        let len = vocab.len();
        let chem_start = chem_start.unwrap_or(SPECIAL_TOKENS);
        if !(SPECIAL_TOKENS..=len).contains(&chem_start) {
            return Err(VocabError::ChemTokenStart {
                start: chem_start,
                len,
            });
        }
        vocab.chem_start = chem_start;
        debug!(
            "Loaded vocabulary of {} tokens with chemical tokens from id {}.",
            len, chem_start,
        );

        Ok(vocab)
    }

    /// Parses a serialized vocabulary.
    ///
    /// The vocabulary has one token per line, the line index is the id.
    pub fn parse(
        vocab: impl BufRead,
        special: SpecialTokens,
        chem_start: Option<usize>,
    ) -> Result<Self, VocabError> {
        Self::from_tokens(read_tokens(vocab)?, special, chem_start)
    }
}

/// Reads the tokens of a serialized vocabulary.
pub(crate) fn read_tokens(vocab: impl BufRead) -> Result<Vec<Token>, IoError> {
    vocab
        .lines()
        .map(|line| line.map(|line| line.trim().into()))
        .collect()
}

impl<N> Vocab<N> {
    /// Serializes the vocabulary with one token per line, ordered by id.
    pub fn write(&self, mut writer: impl Write) -> Result<(), VocabError> {
        for token in &self.tokens {
            writeln!(writer, "{}", token)?;
        }
        writer.flush().map_err(Into::into)
    }

    /// Gets the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Checks whether the vocabulary is empty.
    ///
    /// This is never the case, because the special tokens are always present.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Gets the special tokens.
    pub fn special(&self) -> &SpecialTokens {
        &self.special
    }

    /// Gets the range of ids of the chemical tokens.
    pub fn chem_tokens(&self) -> Range<usize> {
        self.chem_start..self.tokens.len()
    }

    /// Gets all tokens ordered by id.
    pub fn tokens(&self) -> &[Token] {
        self.tokens.as_slice()
    }

    /// Gets the token at the index.
    pub(crate) fn token_at(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx)
    }
}

impl<N> Vocab<N>
where
    N: Copy,
{
    /// Gets the id of the token.
    pub fn get(&self, token: &str) -> Option<N> {
        self.ids.get(token).copied()
    }

    /// Gets the padding id.
    pub fn pad_id(&self) -> N {
        self.special_ids[0]
    }

    /// Gets the unknown id.
    pub fn unk_id(&self) -> N {
        self.special_ids[1]
    }

    /// Gets the begin id.
    pub fn begin_id(&self) -> N {
        self.special_ids[2]
    }

    /// Gets the end id.
    pub fn end_id(&self) -> N {
        self.special_ids[3]
    }

    /// Gets the mask id.
    pub fn mask_id(&self) -> N {
        self.special_ids[4]
    }

    /// Gets the separator id.
    pub fn sep_id(&self) -> N {
        self.special_ids[5]
    }
}

impl<N> Vocab<N>
where
    N: ToPrimitive,
{
    /// Gets the token of the id.
    pub fn token(&self, id: N) -> Option<&Token> {
        id.to_usize().and_then(|idx| self.tokens.get(idx))
    }
}
