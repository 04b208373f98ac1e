use derive_more::{Deref, From};
use ndarray::{s, Array2};
use smiles_tokenizer::{Encoding, Tokenizer};

/// The time-major token ids of a batch, shaped `[sequence, batch]`.
#[derive(Clone, Debug, Deref, From)]
pub struct TokenIds<N>(pub Array2<N>);

/// The time-major padding masks of a batch, shaped `[sequence, batch]`.
///
/// A position is `true` if it is padding.
#[derive(Clone, Debug, Deref, From)]
pub struct PadMask(pub Array2<bool>);

/// A collated batch for a sequence to sequence model.
#[derive(Clone, Debug)]
pub struct Batch<N> {
    /// The encoder ids.
    pub encoder_input: TokenIds<N>,
    /// The encoder padding masks.
    pub encoder_pad_mask: PadMask,
    /// The decoder ids without the last position.
    pub decoder_input: TokenIds<N>,
    /// The decoder padding masks without the last position.
    pub decoder_pad_mask: PadMask,
    /// The decoder ids without the first position.
    pub target: TokenIds<N>,
    /// The decoder padding masks without the first position.
    pub target_pad_mask: PadMask,
    /// The rendered decoder SMILES strings.
    pub target_smiles: Vec<String>,
}

impl<N> Batch<N>
where
    N: Copy,
{
    /// Collates the padded encoder and decoder encodings.
    ///
    /// The encoder uses its masked tokens if requested and present, its original tokens
    /// otherwise. Both encodings must be padded.
    pub(crate) fn new(
        tokenizer: &Tokenizer<N>,
        encoder: &Encoding,
        masked: bool,
        decoder: &Encoding,
        target_smiles: Vec<String>,
    ) -> Self {
        let encoder_tokens = if masked {
            encoder
                .masked_tokens()
                .unwrap_or_else(|| encoder.original_tokens())
        } else {
            encoder.original_tokens()
        };
        let pad_id = tokenizer.vocab().pad_id();

        let encoder_input = time_major(&tokenizer.convert_tokens_to_ids(encoder_tokens), pad_id);
        let encoder_pad_mask = pad_mask(encoder);
        let decoder_ids = time_major(
            &tokenizer.convert_tokens_to_ids(decoder.original_tokens()),
            pad_id,
        );
        let decoder_pad_mask = pad_mask(decoder);
        let len = decoder_ids.nrows();
        let (last, first) = (len.saturating_sub(1), len.min(1));

        Self {
            encoder_input: encoder_input.into(),
            encoder_pad_mask: encoder_pad_mask.into(),
            decoder_input: decoder_ids.slice(s![..last, ..]).to_owned().into(),
            decoder_pad_mask: decoder_pad_mask.slice(s![..last, ..]).to_owned().into(),
            target: decoder_ids.slice(s![first.., ..]).to_owned().into(),
            target_pad_mask: decoder_pad_mask.slice(s![first.., ..]).to_owned().into(),
            target_smiles,
        }
    }
}

/// Transposes the batch of sequences to a `[sequence, batch]` array.
///
/// Positions beyond the end of a sequence are filled.
fn time_major<T>(sequences: &[Vec<T>], fill: T) -> Array2<T>
where
    T: Copy,
{
    let len = sequences.iter().map(Vec::len).max().unwrap_or_default();
    Array2::from_shape_fn((len, sequences.len()), |(position, sequence)| {
        sequences[sequence].get(position).copied().unwrap_or(fill)
    })
}

/// Gets the time-major padding masks of a padded encoding.
fn pad_mask(encoding: &Encoding) -> Array2<bool> {
    let masks = encoding
        .pad_masks()
        .unwrap_or_default()
        .iter()
        .map(|mask| mask.iter().map(|padded| *padded == 1).collect())
        .collect::<Vec<Vec<bool>>>();
    let len = encoding.max_len();

    Array2::from_shape_fn((len, encoding.len()), |(position, sequence)| {
        masks
            .get(sequence)
            .and_then(|mask| mask.get(position))
            .copied()
            .unwrap_or(true)
    })
}
