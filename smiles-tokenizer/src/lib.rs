#![cfg_attr(doc, forbid(broken_intra_doc_links, private_intra_doc_links))]
//! A SMILES tokenizer which converts chemical line notations into token and id batches.
//!
//! The tokenizer consists of a regex pre-tokenizer, a vocabulary, a post-tokenizer which wraps
//! single or paired sequences with boundary tokens, a masking engine for self-supervised
//! pretraining, a truncation guard and right padding. The ids can be of any numerical data type
//! which implements [`FromPrimitive`]` + `[`ToPrimitive`]` + `[`Copy`].
//!
//! The vocabulary is built once, either from a corpus or from a serialized vocabulary, and is
//! immutable afterwards. The special tokens always occupy the ids `0..6` in the order pad,
//! unknown, begin, end, mask and separator.
//!
//! The pre-tokenizer is configurable by:
//! - The regex pattern, which must cover every character of a valid input.
//!
//! The masking engine is configurable by:
//! - The mask probability.
//! - The substitution weights for masking, random replacement and keeping the token.
//!
//! ```no_run
//! use rand::{rngs::StdRng, SeedableRng};
//! use smiles_tokenizer::{Builder, Truncation};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokenizer = Builder::<u32>::from_file("vocab.txt")?
//!         .with_mask_prob(0.15)?
//!         .with_truncation(Truncation::fixed(512))?
//!         .build()?;
//!
//!     let mut rng = StdRng::seed_from_u64(42);
//!     let encoding = tokenizer.tokenise(&["CCO.Ccc", "C(=O)CBr"], None, true, true, &mut rng)?;
//!     let ids = tokenizer.convert_tokens_to_ids(encoding.original_tokens());
//!
//!     Ok(())
//! }
//! ```
//!
//! [`FromPrimitive`]: num_traits::FromPrimitive
//! [`ToPrimitive`]: num_traits::ToPrimitive

mod builder;
mod config;
mod encoding;
mod masking;
mod padding;
mod post_tokenizer;
mod pre_tokenizer;
mod tokenizer;
mod truncation;
mod vocab;

pub use crate::{
    builder::{Builder, BuilderError},
    config::Config,
    encoding::Encoding,
    masking::{MaskWeights, Masking, MaskingError},
    padding::{pad, Padding},
    post_tokenizer::{PostTokenizer, PostTokenizerError},
    pre_tokenizer::{PreTokenizer, PreTokenizerError, SMILES_PATTERN},
    tokenizer::{DecodeError, Tokenizer, TokenizerError},
    truncation::{Truncation, TruncationError},
    vocab::{SpecialTokens, Vocab, VocabError, SPECIAL_TOKENS},
};

/// A token of a SMILES string.
///
/// A stack allocated string with a maximum length of eight bytes, only long bracket atoms spill to
/// the heap.
pub type Token = smallstr::SmallString<[u8; 8]>;
