use crate::{
    padding::{pad_to, Padding},
    Token,
};

/// An encoded batch of sequences.
///
/// All views are row aligned with the original tokens. The masked views are only present if
/// masking was requested and the padding masks are only present if padding was requested.
#[derive(Clone, Debug, PartialEq)]
pub struct Encoding {
    pub(crate) original_tokens: Vec<Vec<Token>>,
    pub(crate) masked_tokens: Option<Vec<Vec<Token>>>,
    pub(crate) token_masks: Option<Vec<Vec<bool>>>,
    pub(crate) pad_masks: Option<Vec<Vec<u8>>>,
    pub(crate) segment_masks: Vec<Vec<u8>>,
    pub(crate) truncated: usize,
}

impl Encoding {
    /// Creates an encoding from assembled sequences and their segment masks.
    pub(crate) fn new(original_tokens: Vec<Vec<Token>>, segment_masks: Vec<Vec<u8>>) -> Self {
        Self {
            original_tokens,
            masked_tokens: None,
            token_masks: None,
            pad_masks: None,
            segment_masks,
            truncated: 0,
        }
    }

    /// Gets the number of sequences.
    pub fn len(&self) -> usize {
        self.original_tokens.len()
    }

    /// Checks whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.original_tokens.is_empty()
    }

    /// Gets the length of the longest sequence.
    pub fn max_len(&self) -> usize {
        self.original_tokens
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or_default()
    }

    /// Gets the assembled tokens before masking.
    pub fn original_tokens(&self) -> &[Vec<Token>] {
        &self.original_tokens
    }

    /// Gets the assembled tokens after masking.
    pub fn masked_tokens(&self) -> Option<&[Vec<Token>]> {
        self.masked_tokens.as_deref()
    }

    /// Gets the selection masks, `true` where a token was selected for corruption.
    pub fn token_masks(&self) -> Option<&[Vec<bool>]> {
        self.token_masks.as_deref()
    }

    /// Gets the padding masks, `1` for appended padding and `0` for content.
    ///
    /// The masks are shared by the original and the masked tokens.
    pub fn pad_masks(&self) -> Option<&[Vec<u8>]> {
        self.pad_masks.as_deref()
    }

    /// Gets the segment masks, `0` for the first and `1` for the second sequence of a pair.
    pub fn segment_masks(&self) -> &[Vec<u8>] {
        &self.segment_masks
    }

    /// Gets the number of sequences which were clipped by the truncation.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// Keeps the `len` leading positions of every view.
    pub(crate) fn truncate(mut self, len: usize) -> Self {
        self.truncated += self
            .original_tokens
            .iter()
            .filter(|sequence| sequence.len() > len)
            .count();

        clip(&mut self.original_tokens, len);
        if let Some(masked_tokens) = self.masked_tokens.as_mut() {
            clip(masked_tokens, len);
        }
        if let Some(token_masks) = self.token_masks.as_mut() {
            clip(token_masks, len);
        }
        if let Some(pad_masks) = self.pad_masks.as_mut() {
            clip(pad_masks, len);
        }
        clip(&mut self.segment_masks, len);

        self
    }

    /// Right-pads every view according to the padding strategy.
    ///
    /// The tokens are padded with the pad token, the selection masks with `false` and the segment
    /// masks with `0`. Padding masks of an already padded encoding are carried over and extended
    /// with `1`.
    pub(crate) fn pad(self, padding: &Padding, pad_token: &Token) -> Self {
        let len = padding.len(self.max_len());

        let (original_tokens, pad_masks) = pad_to(self.original_tokens, len, pad_token.clone());
        let pad_masks = match self.pad_masks {
            Some(prior) => pad_to(prior, len, 1).0,
            None => pad_masks,
        };
        let masked_tokens = self
            .masked_tokens
            .map(|masked_tokens| pad_to(masked_tokens, len, pad_token.clone()).0);
        let token_masks = self
            .token_masks
            .map(|token_masks| pad_to(token_masks, len, false).0);
        let (segment_masks, _) = pad_to(self.segment_masks, len, 0);

        Self {
            original_tokens,
            masked_tokens,
            token_masks,
            pad_masks: Some(pad_masks),
            segment_masks,
            truncated: self.truncated,
        }
    }
}

fn clip<T>(sequences: &mut [Vec<T>], len: usize) {
    for sequence in sequences {
        sequence.truncate(len);
    }
}
