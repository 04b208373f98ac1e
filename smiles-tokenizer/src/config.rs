use serde::{Deserialize, Serialize};

use crate::{masking::MaskWeights, pre_tokenizer::SMILES_PATTERN, vocab::SpecialTokens};

/// The serializable tokenizer configuration.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The pre-tokenizer pattern.
    pub pattern: String,
    /// The special tokens.
    pub special_tokens: SpecialTokens,
    /// The mask probability.
    pub mask_prob: f64,
    /// The substitution weights for selected tokens.
    pub mask_weights: MaskWeights,
    /// The maximum sequence length including the boundary tokens, unlimited if `None`.
    pub max_seq_len: Option<usize>,
    /// The id of the first chemical token, right after the special tokens if `None`.
    pub chem_token_start: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern: SMILES_PATTERN.to_string(),
            special_tokens: SpecialTokens::default(),
            mask_prob: 0.15,
            mask_weights: MaskWeights::default(),
            max_seq_len: None,
            chem_token_start: None,
        }
    }
}
