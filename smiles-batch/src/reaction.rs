use rand::Rng;
use smiles_tokenizer::{Tokenizer, Truncation};

use crate::{
    augmenter::{render_batch, Augmenter},
    batch::Batch,
    CollatorError,
};

/// The reaction sides which are rendered randomized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Augment {
    /// No augmentation.
    None,
    /// Augmentation of the reactants only.
    Reactants,
    /// Augmentation of the reactants and the products.
    All,
}

impl Default for Augment {
    fn default() -> Self {
        Self::None
    }
}

/// A collator of reaction batches for forward prediction.
///
/// The reactants are the encoder input and the products are the decoder target, nothing is
/// masked.
pub struct ReactionCollator<'t, N, A> {
    tokenizer: &'t Tokenizer<N>,
    augmenter: A,
    augment: Augment,
    truncation: Truncation,
}

impl<'t, N, A> ReactionCollator<'t, N, A>
where
    N: Copy,
    A: Augmenter,
{
    /// Creates a collator without augmentation and without a maximum sequence length.
    pub fn new(tokenizer: &'t Tokenizer<N>, augmenter: A) -> Self {
        Self {
            tokenizer,
            augmenter,
            augment: Augment::default(),
            truncation: Truncation::none(),
        }
    }

    /// Configures the augmented reaction sides.
    pub fn with_augment(mut self, augment: Augment) -> Self {
        self.augment = augment;
        self
    }

    /// Clips the padded sequences to the maximum length, including the boundary tokens.
    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Result<Self, CollatorError> {
        self.truncation = Truncation::fixed(max_seq_len).validate()?;
        Ok(self)
    }

    /// Collates the batch of reactant and product pairs.
    ///
    /// # Errors
    /// Fails if the batch is empty, if a molecule can't be rendered or if a rendered SMILES string
    /// is malformed.
    pub fn collate<S, R>(&self, batch: &[(S, S)], rng: &mut R) -> Result<Batch<N>, CollatorError>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if batch.is_empty() {
            return Err(CollatorError::EmptyBatch);
        }

        let reactants = render_batch(
            &self.augmenter,
            batch.iter().map(|(reactants, _)| reactants),
            self.augment != Augment::None,
        )?;
        let products = render_batch(
            &self.augmenter,
            batch.iter().map(|(_, products)| products),
            self.augment == Augment::All,
        )?;

        let encoder = self
            .tokenizer
            .tokenise(&reactants, None, false, true, rng)?;
        let encoder = self.truncation.truncate(encoder);
        let decoder = self
            .tokenizer
            .tokenise(&products, None, false, true, rng)?;
        let decoder = self.truncation.truncate(decoder);

        Ok(Batch::new(
            self.tokenizer,
            &encoder,
            false,
            &decoder,
            products,
        ))
    }
}
