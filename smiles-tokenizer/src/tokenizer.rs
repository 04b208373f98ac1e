use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

use displaydoc::Display;
use log::debug;
use num_traits::ToPrimitive;
use rand::Rng;
use thiserror::Error;

use crate::{
    encoding::Encoding,
    masking::Masking,
    padding::Padding,
    post_tokenizer::{PostTokenizer, PostTokenizerError},
    pre_tokenizer::{PreTokenizer, PreTokenizerError},
    truncation::Truncation,
    vocab::Vocab,
    Token,
};

/// A SMILES tokenizer.
///
/// Can be created via the [`Builder`] and consists of a regex pre-tokenizer, an immutable
/// vocabulary, a post-tokenizer, a masking engine and truncation and padding strategies.
///
/// The tokenizer can be shared by reference between threads, the only mutable state are the
/// unknown token counts.
///
/// [`Builder`]: crate::Builder
#[derive(Debug)]
pub struct Tokenizer<N> {
    pub(crate) pre_tokenizer: PreTokenizer,
    pub(crate) vocab: Vocab<N>,
    pub(crate) post_tokenizer: PostTokenizer,
    pub(crate) masking: Masking,
    pub(crate) truncation: Truncation,
    pub(crate) padding: Padding,
    pub(crate) unknown: Mutex<BTreeMap<Token, usize>>,
}

/// The potential errors of the tokenizer.
#[derive(Debug, Display, Error)]
pub enum TokenizerError {
    /// Failed to pre-tokenize: {0}
    PreTokenizer(#[from] PreTokenizerError),
    /// Failed to post-tokenize: {0}
    PostTokenizer(#[from] PostTokenizerError),
}

/// The potential errors of the inverse conversion.
#[derive(Debug, Display, Error)]
pub enum DecodeError {
    /// The id at position {position} of sequence {sequence} is not in the vocabulary
    UnknownId { sequence: usize, position: usize },
}

impl<N> Tokenizer<N> {
    /// Gets the vocabulary.
    pub fn vocab(&self) -> &Vocab<N> {
        &self.vocab
    }

    /// Gets the number of tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Checks whether the vocabulary is empty, which is never the case.
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Gets the masking engine.
    pub fn masking(&self) -> &Masking {
        &self.masking
    }

    /// Gets the truncation strategy.
    pub fn truncation(&self) -> &Truncation {
        &self.truncation
    }

    /// Splits the SMILES strings into tokens without boundary tokens.
    pub fn split(&self, batch: &[impl AsRef<str>]) -> Result<Vec<Vec<Token>>, TokenizerError> {
        self.pre_tokenizer
            .pre_tokenize_batch(batch)
            .map_err(Into::into)
    }

    /// Tokenises a batch of single or paired SMILES strings.
    ///
    /// The strings are split, assembled with boundary tokens, optionally masked, truncated and
    /// optionally padded. The masked views are only present if `mask` is set and the padding
    /// masks are only present if `pad` is set. The generator is only drawn from while masking.
    ///
    /// # Errors
    /// Fails if any string is malformed or if the paired batches differ in length. Nothing is
    /// returned for the rest of the batch in that case.
    pub fn tokenise<S, R>(
        &self,
        first: &[S],
        second: Option<&[S]>,
        mask: bool,
        pad: bool,
        rng: &mut R,
    ) -> Result<Encoding, TokenizerError>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let first = self.pre_tokenizer.pre_tokenize_batch(first)?;
        let second = second
            .map(|second| self.pre_tokenizer.pre_tokenize_batch(second))
            .transpose()?;
        let (sequences, segments) = self.post_tokenizer.assemble(first, second)?;

        let mut encoding = Encoding::new(sequences, segments);
        if mask {
            let (masked_tokens, token_masks) =
                self.masking.mask(&encoding.original_tokens, &self.vocab, rng);
            encoding.masked_tokens = Some(masked_tokens);
            encoding.token_masks = Some(token_masks);
        }

        let encoding = self.truncation.truncate(encoding);
        if pad {
            let padding = self.padding.capped(self.truncation.max_len());
            Ok(encoding.pad(&padding, &self.vocab.special().pad))
        } else {
            Ok(encoding)
        }
    }

    /// Converts tokens to ids.
    ///
    /// Tokens which aren't in the vocabulary are mapped to the unknown id and counted.
    pub fn convert_tokens_to_ids<T>(&self, batch: &[Vec<T>]) -> Vec<Vec<N>>
    where
        T: AsRef<str>,
        N: Copy,
    {
        let mut unknown = BTreeMap::<&str, usize>::new();
        let unk_id = self.vocab.unk_id();
        let ids = batch
            .iter()
            .map(|sequence| {
                sequence
                    .iter()
                    .map(|token| {
                        let token = token.as_ref();
                        self.vocab.get(token).unwrap_or_else(|| {
                            *unknown.entry(token).or_default() += 1;
                            unk_id
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        if !unknown.is_empty() {
            let mut counts = self.unknown.lock().unwrap_or_else(PoisonError::into_inner);
            for (token, count) in unknown {
                let total = counts.entry(token.into()).or_default();
                if *total == 0 {
                    debug!("Unknown token `{}` mapped to the unknown id.", token);
                }
                *total += count;
            }
        }

        ids
    }

    /// Converts ids to tokens.
    ///
    /// # Errors
    /// Fails if any id is not in the vocabulary.
    pub fn convert_ids_to_tokens(&self, batch: &[Vec<N>]) -> Result<Vec<Vec<Token>>, DecodeError>
    where
        N: ToPrimitive + Copy,
    {
        batch
            .iter()
            .enumerate()
            .map(|(sequence, ids)| {
                ids.iter()
                    .enumerate()
                    .map(|(position, id)| {
                        self.vocab
                            .token(*id)
                            .cloned()
                            .ok_or(DecodeError::UnknownId { sequence, position })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    /// Joins tokens back into SMILES strings.
    ///
    /// A leading begin token is dropped, the sequence is cut at its first end token and padding
    /// tokens are dropped.
    pub fn detokenise<T>(&self, batch: &[Vec<T>]) -> Vec<String>
    where
        T: AsRef<str>,
    {
        let special = self.vocab.special();
        batch
            .iter()
            .map(|sequence| {
                let mut tokens = sequence.iter().map(AsRef::<str>::as_ref).peekable();
                if tokens.peek() == Some(&special.begin.as_str()) {
                    tokens.next();
                }
                tokens
                    .take_while(|token| *token != special.end.as_str())
                    .filter(|token| *token != special.pad.as_str())
                    .collect()
            })
            .collect()
    }

    /// Reports the counts of the tokens which were mapped to the unknown id, ordered by token.
    pub fn report_unknown_tokens(&self) -> BTreeMap<Token, usize> {
        self.unknown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resets the counts of the unknown tokens.
    pub fn reset_unknown_tokens(&self) {
        self.unknown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
