#![cfg_attr(doc, forbid(broken_intra_doc_links, private_intra_doc_links))]
//! Collation of SMILES batches for sequence to sequence models.
//!
//! The collators render the molecules through an [`Augmenter`], tokenise them with a shared
//! [`Tokenizer`] and emit time-major id and padding mask arrays:
//! - The [`MoleculeCollator`] for masked pretraining on single molecules.
//! - The [`ReactionCollator`] for forward prediction on reactant and product pairs.
//!
//! ```no_run
//! use rand::{rngs::StdRng, SeedableRng};
//! use smiles_batch::{Identity, MoleculeCollator};
//! use smiles_tokenizer::Builder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokenizer = Builder::<i64>::from_file("vocab.txt")?.build()?;
//!     let collator = MoleculeCollator::new(&tokenizer, Identity).with_max_seq_len(512)?;
//!
//!     let mut rng = StdRng::seed_from_u64(42);
//!     let batch = collator.collate(&["CCO", "C(=O)CBr"], true, &mut rng)?;
//!     assert_eq!(batch.encoder_input.shape(), batch.encoder_pad_mask.shape());
//!
//!     Ok(())
//! }
//! ```
//!
//! [`Tokenizer`]: smiles_tokenizer::Tokenizer

mod augmenter;
mod batch;
mod molecule;
mod reaction;

use displaydoc::Display;
use smiles_tokenizer::{TokenizerError, TruncationError};
use thiserror::Error;

pub use crate::{
    augmenter::{Augmenter, AugmenterError, Identity},
    batch::{Batch, PadMask, TokenIds},
    molecule::MoleculeCollator,
    reaction::{Augment, ReactionCollator},
};

/// The potential errors of the collators.
#[derive(Debug, Display, Error)]
pub enum CollatorError {
    /// The batch is empty
    EmptyBatch,
    /// Invalid maximum sequence length: {0}
    Truncation(#[from] TruncationError),
    /// Failed to render a molecule: {0}
    Augmenter(#[from] AugmenterError),
    /// Failed to tokenise the batch: {0}
    Tokenizer(#[from] TokenizerError),
}
