use rand::Rng;
use smiles_tokenizer::{Tokenizer, Truncation};

use crate::{
    augmenter::{render_batch, Augmenter},
    batch::Batch,
    CollatorError,
};

/// A collator of molecule batches for masked pretraining.
///
/// Every molecule is rendered twice, once as encoder input and once as decoder target, both
/// randomized if augmentation is enabled.
pub struct MoleculeCollator<'t, N, A> {
    tokenizer: &'t Tokenizer<N>,
    augmenter: A,
    augment: bool,
    truncation: Truncation,
}

impl<'t, N, A> MoleculeCollator<'t, N, A>
where
    N: Copy,
    A: Augmenter,
{
    /// Creates a collator with augmentation enabled and without a maximum sequence length.
    pub fn new(tokenizer: &'t Tokenizer<N>, augmenter: A) -> Self {
        Self {
            tokenizer,
            augmenter,
            augment: true,
            truncation: Truncation::none(),
        }
    }

    /// Whether the molecules are rendered randomized.
    ///
    /// Defaults to `true`.
    pub fn with_augment(mut self, augment: bool) -> Self {
        self.augment = augment;
        self
    }

    /// Clips the padded sequences to the maximum length, including the boundary tokens.
    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Result<Self, CollatorError> {
        self.truncation = Truncation::fixed(max_seq_len).validate()?;
        Ok(self)
    }

    /// Collates the batch of molecules.
    ///
    /// The encoder side is masked, but the masked tokens are only used when training.
    ///
    /// # Errors
    /// Fails if the batch is empty, if a molecule can't be rendered or if a rendered SMILES string
    /// is malformed.
    pub fn collate<S, R>(
        &self,
        batch: &[S],
        train: bool,
        rng: &mut R,
    ) -> Result<Batch<N>, CollatorError>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if batch.is_empty() {
            return Err(CollatorError::EmptyBatch);
        }

        let encoder_smiles = render_batch(&self.augmenter, batch, self.augment)?;
        let decoder_smiles = render_batch(&self.augmenter, batch, self.augment)?;

        let encoder = self
            .tokenizer
            .tokenise(&encoder_smiles, None, true, true, rng)?;
        let encoder = self.truncation.truncate(encoder);
        let decoder = self
            .tokenizer
            .tokenise(&decoder_smiles, None, false, true, rng)?;
        let decoder = self.truncation.truncate(decoder);

        Ok(Batch::new(
            self.tokenizer,
            &encoder,
            train,
            &decoder,
            decoder_smiles,
        ))
    }
}
