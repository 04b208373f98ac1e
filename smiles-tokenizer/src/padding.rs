use std::iter::repeat;

/// A padding strategy.
///
/// Defaults to the [`batch_longest()`] padding strategy.
///
/// [`batch_longest()`]: Padding::batch_longest
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Padding(Paddings);

/// The available padding strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Paddings {
    /// Padding to the longest sequence of the batch.
    BatchLongest,
    /// Padding to a fixed length, or to the longest sequence if that is longer.
    Fixed(usize),
}

impl Default for Padding {
    fn default() -> Self {
        Self::batch_longest()
    }
}

impl Padding {
    /// Creates a padding strategy to the longest sequence of the batch.
    pub fn batch_longest() -> Self {
        Self(Paddings::BatchLongest)
    }

    /// Creates a fixed-length padding strategy.
    ///
    /// Batches with longer sequences are padded to their longest sequence instead, the truncation
    /// strategy is in charge of clipping them. The tokenizer caps the length at its maximum
    /// sequence length.
    pub fn fixed(len: usize) -> Self {
        Self(Paddings::Fixed(len))
    }

    /// Gets the padded length for a batch with the given longest sequence.
    pub(crate) fn len(&self, longest: usize) -> usize {
        match self.0 {
            Paddings::BatchLongest => longest,
            Paddings::Fixed(len) => len.max(longest),
        }
    }

    /// Caps a fixed padding length at the maximum sequence length, if any.
    pub(crate) fn capped(self, max_len: Option<usize>) -> Self {
        match (self.0, max_len) {
            (Paddings::Fixed(len), Some(max_len)) => Self::fixed(len.min(max_len)),
            _ => self,
        }
    }
}

/// Right-pads the sequences to the length of the longest sequence in the batch.
///
/// Returns the padded sequences and the padding masks, which are `1` for appended filler and `0`
/// for original content. Empty sequences become rows of filler only.
///
/// The filler depends on what is padded, e.g. the pad token for tokens, `0` for segment masks and
/// `1` for a prior mask whose padded positions must be marked as invalid.
pub fn pad<T>(sequences: Vec<Vec<T>>, fill: T) -> (Vec<Vec<T>>, Vec<Vec<u8>>)
where
    T: Clone,
{
    let len = sequences.iter().map(Vec::len).max().unwrap_or_default();
    pad_to(sequences, len, fill)
}

/// Right-pads the sequences to the length.
///
/// Sequences which are already longer are left unchanged.
pub(crate) fn pad_to<T>(sequences: Vec<Vec<T>>, len: usize, fill: T) -> (Vec<Vec<T>>, Vec<Vec<u8>>)
where
    T: Clone,
{
    sequences
        .into_iter()
        .map(|mut sequence| {
            let pad_len = len.saturating_sub(sequence.len());
            let mask: Vec<u8> = repeat(0)
                .take(sequence.len())
                .chain(repeat(1).take(pad_len))
                .collect();
            sequence.extend(repeat(fill.clone()).take(pad_len));
            (sequence, mask)
        })
        .unzip()
}
