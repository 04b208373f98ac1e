use displaydoc::Display;
use rand::{
    distributions::{Distribution, WeightedError, WeightedIndex},
    Rng,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{vocab::Vocab, Token};

/// The substitution weights for selected tokens.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskWeights {
    /// Replace the token with the mask token.
    pub mask: f64,
    /// Replace the token with a random chemical token.
    pub random: f64,
    /// Keep the token.
    pub keep: f64,
}

impl Default for MaskWeights {
    fn default() -> Self {
        Self {
            mask: 0.8,
            random: 0.1,
            keep: 0.1,
        }
    }
}

/// The potential errors of the masking engine.
#[derive(Debug, Display, Error)]
pub enum MaskingError {
    /// The mask probability must be within [0, 1], got {0}
    Probability(f64),
    /// Invalid substitution weights: {0}
    Weights(#[from] WeightedError),
}

/// A masking engine.
///
/// Selects each eligible token with the mask probability and substitutes a selected token with the
/// mask token, a random chemical token or itself according to the [`MaskWeights`]. Begin, end and
/// separator tokens are never eligible.
#[derive(Clone, Debug)]
pub struct Masking {
    prob: f64,
    weights: WeightedIndex<f64>,
}

/// The outcomes of the substitution, in the order of the weights.
const MASK: usize = 0;
const RANDOM: usize = 1;

impl Masking {
    /// Creates a masking engine.
    ///
    /// # Errors
    /// Fails if the probability isn't within `[0, 1]` or if the weights are negative or all zero.
    pub fn new(prob: f64, weights: MaskWeights) -> Result<Self, MaskingError> {
        let prob = validate_prob(prob)?;
        let weights = WeightedIndex::new(&[weights.mask, weights.random, weights.keep])?;

        Ok(Self { prob, weights })
    }

    /// Gets the mask probability.
    pub fn prob(&self) -> f64 {
        self.prob
    }

    /// Masks the sequences.
    ///
    /// Returns the corrupted sequences and the selection masks. A zero mask probability leaves the
    /// sequences unchanged without drawing from the generator.
    ///
    /// The generator must not be shared between threads without synchronization; the results are
    /// reproducible for a fixed seed and call order.
    pub fn mask<N, R>(
        &self,
        sequences: &[Vec<Token>],
        vocab: &Vocab<N>,
        rng: &mut R,
    ) -> (Vec<Vec<Token>>, Vec<Vec<bool>>)
    where
        R: Rng + ?Sized,
    {
        if self.prob == 0. {
            return empty_mask(sequences);
        }

        let special = vocab.special();
        let chem_tokens = vocab.chem_tokens();
        sequences
            .iter()
            .map(|sequence| {
                sequence
                    .iter()
                    .map(|token| {
                        if special.is_boundary(token) || rng.gen::<f64>() >= self.prob {
                            return (token.clone(), false);
                        }
                        let token = match self.weights.sample(&mut *rng) {
                            MASK => special.mask.clone(),
                            RANDOM if !chem_tokens.is_empty() => vocab
                                .token_at(rng.gen_range(chem_tokens.clone()))
                                .unwrap_or(token)
                                .clone(),
                            _ => token.clone(),
                        };
                        (token, true)
                    })
                    .unzip::<_, _, Vec<_>, Vec<_>>()
            })
            .unzip()
    }
}

/// Validates a mask probability.
pub(crate) fn validate_prob(prob: f64) -> Result<f64, MaskingError> {
    if (0. ..=1.).contains(&prob) {
        Ok(prob)
    } else {
        Err(MaskingError::Probability(prob))
    }
}

/// Leaves the sequences unchanged and selects nothing.
pub(crate) fn empty_mask(sequences: &[Vec<Token>]) -> (Vec<Vec<Token>>, Vec<Vec<bool>>) {
    sequences
        .iter()
        .map(|sequence| (sequence.clone(), vec![false; sequence.len()]))
        .unzip()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use super::*;
    use crate::{
        post_tokenizer::PostTokenizer,
        pre_tokenizer::{PreTokenizer, SMILES_PATTERN},
        vocab::SpecialTokens,
    };

    const CORPUS: [&str; 3] = ["CCO.Ccc", "CCClCCl", "C(=O)CBr"];

    fn vocab() -> Vocab<u32> {
        let pre_tokenizer = PreTokenizer::new(SMILES_PATTERN).unwrap();
        Vocab::from_corpus(&CORPUS, &pre_tokenizer, SpecialTokens::default()).unwrap()
    }

    fn tokens(tokens: &[&str]) -> Vec<Token> {
        tokens.iter().map(|&token| token.into()).collect()
    }

    fn sequences() -> Vec<Vec<Token>> {
        vec![
            tokens(&["^", "C", "(", "=", "O", ")", "unknown", "&"]),
            tokens(&["^", "C", "C", "<SEP>", "C", "Br", "&"]),
        ]
    }

    fn weights(mask: f64, random: f64, keep: f64) -> MaskWeights {
        MaskWeights { mask, random, keep }
    }

    #[test]
    fn test_empty_mask() {
        let masking = Masking::new(0., MaskWeights::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let (masked, selected) = masking.mask(&sequences(), &vocab(), &mut rng);

        assert_eq!(masked, sequences());
        assert!(selected.iter().flatten().all(|selected| !selected));
        assert_eq!(
            selected.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![8, 7],
        );
    }

    #[test]
    fn test_mask_all() {
        let masking = Masking::new(1., weights(1., 0., 0.)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let (masked, selected) = masking.mask(&sequences(), &vocab(), &mut rng);

        assert_eq!(
            masked,
            vec![
                tokens(&[
                    "^", "<MASK>", "<MASK>", "<MASK>", "<MASK>", "<MASK>", "<MASK>", "&",
                ]),
                tokens(&["^", "<MASK>", "<MASK>", "<SEP>", "<MASK>", "<MASK>", "&"]),
            ],
        );
        assert_eq!(
            selected,
            vec![
                vec![false, true, true, true, true, true, true, false],
                vec![false, true, true, false, true, true, false],
            ],
        );
    }

    #[test]
    fn test_mask_keep() {
        let masking = Masking::new(1., weights(0., 0., 1.)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let (masked, selected) = masking.mask(&sequences(), &vocab(), &mut rng);

        assert_eq!(masked, sequences());
        assert_eq!(
            selected.iter().flatten().filter(|selected| **selected).count(),
            6 + 4,
        );
    }

    #[test]
    fn test_mask_random() {
        let vocab = vocab();
        let masking = Masking::new(1., weights(0., 1., 0.)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let (masked, _) = masking.mask(&sequences(), &vocab, &mut rng);

        let chem_tokens = &vocab.tokens()[vocab.chem_tokens()];
        for (masked, original) in masked.iter().flatten().zip(sequences().iter().flatten()) {
            if vocab.special().is_boundary(original) {
                assert_eq!(masked, original);
            } else {
                assert!(chem_tokens.contains(masked));
            }
        }
    }

    #[test]
    fn test_mask_random_without_chem_tokens() {
        let pre_tokenizer = PreTokenizer::new(SMILES_PATTERN).unwrap();
        let vocab =
            Vocab::<u32>::from_corpus(&[] as &[&str], &pre_tokenizer, SpecialTokens::default())
                .unwrap();
        let masking = Masking::new(1., weights(0., 1., 0.)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let (masked, selected) = masking.mask(&sequences(), &vocab, &mut rng);

        assert_eq!(masked, sequences());
        assert!(selected[0][1]);
    }

    #[test]
    fn test_mask_reproducible() {
        let masking = Masking::new(0.4, MaskWeights::default()).unwrap();
        let vocab = vocab();

        let first = masking.mask(&sequences(), &vocab, &mut StdRng::seed_from_u64(7));
        let second = masking.mask(&sequences(), &vocab, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_mask_selection_consistent() {
        let masking = Masking::new(0.5, MaskWeights::default()).unwrap();
        let vocab = vocab();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..20 {
            let (masked, selected) = masking.mask(&sequences(), &vocab, &mut rng);
            for ((masked, original), selected) in masked
                .iter()
                .flatten()
                .zip(sequences().iter().flatten())
                .zip(selected.iter().flatten())
            {
                // unselected tokens are never changed, selected ones may coincide
                if !selected {
                    assert_eq!(masked, original);
                }
                if vocab.special().is_boundary(original) {
                    assert!(!selected);
                }
            }
        }
    }

    #[test]
    fn test_mask_assembled_pairs() {
        let pre_tokenizer = PreTokenizer::new(SMILES_PATTERN).unwrap();
        let (sequences, _) = PostTokenizer::new(&SpecialTokens::default())
            .assemble(
                pre_tokenizer.pre_tokenize_batch(&CORPUS).unwrap(),
                Some(pre_tokenizer.pre_tokenize_batch(&CORPUS).unwrap()),
            )
            .unwrap();
        let masking = Masking::new(1., weights(1., 0., 0.)).unwrap();
        let (masked, _) = masking.mask(&sequences, &vocab(), &mut StdRng::seed_from_u64(0));

        for masked in masked {
            assert_eq!(masked.first().map(Token::as_str), Some("^"));
            assert_eq!(masked.last().map(Token::as_str), Some("&"));
            assert_eq!(
                masked
                    .iter()
                    .filter(|token| token.as_str() == "<SEP>")
                    .count(),
                1,
            );
        }
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.1)]
    #[case(f64::NAN)]
    fn test_invalid_prob(#[case] prob: f64) {
        assert!(matches!(
            Masking::new(prob, MaskWeights::default()).unwrap_err(),
            MaskingError::Probability(_),
        ));
    }

    #[rstest]
    #[case(weights(0., 0., 0.))]
    #[case(weights(-1., 1., 1.))]
    fn test_invalid_weights(#[case] weights: MaskWeights) {
        assert!(matches!(
            Masking::new(0.15, weights).unwrap_err(),
            MaskingError::Weights(_),
        ));
    }
}
