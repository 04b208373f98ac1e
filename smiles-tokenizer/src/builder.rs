use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader, Error as IoError},
    marker::PhantomData,
    path::Path,
    sync::Mutex,
};

use displaydoc::Display;
use num_traits::FromPrimitive;
use thiserror::Error;

use crate::{
    config::Config,
    masking::{validate_prob, MaskWeights, Masking, MaskingError},
    padding::Padding,
    post_tokenizer::PostTokenizer,
    pre_tokenizer::{PreTokenizer, PreTokenizerError, SMILES_PATTERN},
    tokenizer::Tokenizer,
    truncation::{Truncation, TruncationError},
    vocab::{read_tokens, SpecialTokens, Vocab, VocabError},
    Token,
};

/// The source of the vocabulary.
#[derive(Debug)]
enum Source {
    /// A corpus of SMILES strings to build the vocabulary from.
    Corpus(Vec<String>),
    /// Serialized tokens ordered by id.
    Tokens(Vec<Token>),
}

/// A [`Tokenizer`] builder.
#[derive(Debug)]
pub struct Builder<N> {
    source: Source,
    pre_tokenizer: Option<PreTokenizer>,
    special: SpecialTokens,
    chem_token_start: Option<usize>,
    mask_prob: f64,
    mask_weights: MaskWeights,
    truncation: Truncation,
    padding: Padding,
    id: PhantomData<N>,
}

/// The potential errors of the builder.
#[derive(Debug, Display, Error)]
pub enum BuilderError {
    /// Failed to read the vocabulary: {0}
    Io(#[from] IoError),
    /// Invalid pre-tokenizer: {0}
    PreTokenizer(#[from] PreTokenizerError),
    /// Invalid vocabulary: {0}
    Vocab(#[from] VocabError),
    /// Invalid masking: {0}
    Masking(#[from] MaskingError),
    /// Invalid truncation: {0}
    Truncation(#[from] TruncationError),
}

impl<N> Builder<N> {
    /// Creates a builder with the default settings.
    ///
    /// The default settings are:
    /// - The [`SMILES_PATTERN`] for the [`PreTokenizer`].
    /// - The default [`SpecialTokens`], with the chemical tokens right after them.
    /// - A mask probability of `0.15` and the default [`MaskWeights`].
    /// - The default [`Truncation`] and [`Padding`] strategies.
    fn new(source: Source) -> Self {
        let config = Config::default();
        Self {
            source,
            pre_tokenizer: None,
            special: config.special_tokens,
            chem_token_start: config.chem_token_start,
            mask_prob: config.mask_prob,
            mask_weights: config.mask_weights,
            truncation: Truncation::default(),
            padding: Padding::default(),
            id: PhantomData,
        }
    }

    /// Creates a [`Tokenizer`] builder which builds the vocabulary from a corpus.
    ///
    /// The corpus is split with the configured pre-tokenizer when the tokenizer is built.
    pub fn from_corpus(corpus: &[impl AsRef<str>]) -> Self {
        let corpus = corpus
            .iter()
            .map(|smiles| smiles.as_ref().to_string())
            .collect();
        Self::new(Source::Corpus(corpus))
    }

    /// Creates a [`Tokenizer`] builder from a serialized vocabulary file.
    pub fn from_file(vocab: impl AsRef<Path>) -> Result<Self, BuilderError> {
        Self::from_vocab(BufReader::new(File::open(vocab)?))
    }

    /// Creates a [`Tokenizer`] builder from a serialized vocabulary.
    ///
    /// The vocabulary has one token per line, the line index is the id. It is validated against
    /// the special tokens when the tokenizer is built.
    pub fn from_vocab(vocab: impl BufRead) -> Result<Self, BuilderError> {
        Ok(Self::new(Source::Tokens(read_tokens(vocab)?)))
    }

    /// Configures the pre-tokenizer pattern.
    pub fn with_pattern(mut self, pattern: impl AsRef<str>) -> Result<Self, BuilderError> {
        self.pre_tokenizer = Some(PreTokenizer::new(pattern.as_ref())?);
        Ok(self)
    }

    /// Configures the special tokens.
    pub fn with_special_tokens(mut self, special: SpecialTokens) -> Self {
        self.special = special;
        self
    }

    /// Configures the id of the first chemical token.
    ///
    /// The id is validated against the vocabulary when the tokenizer is built.
    pub fn with_chem_token_start(mut self, start: usize) -> Self {
        self.chem_token_start = Some(start);
        self
    }

    /// Configures the mask probability.
    pub fn with_mask_prob(mut self, prob: f64) -> Result<Self, BuilderError> {
        self.mask_prob = validate_prob(prob)?;
        Ok(self)
    }

    /// Configures the substitution weights for selected tokens.
    pub fn with_mask_weights(mut self, weights: MaskWeights) -> Result<Self, BuilderError> {
        Masking::new(self.mask_prob, weights)?;
        self.mask_weights = weights;
        Ok(self)
    }

    /// Configures the truncation strategy.
    pub fn with_truncation(mut self, truncation: Truncation) -> Result<Self, BuilderError> {
        self.truncation = truncation.validate()?;
        Ok(self)
    }

    /// Configures the padding strategy.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Configures everything which is part of the serializable configuration.
    ///
    /// A chemical token start which is missing from the configuration keeps the one configured
    /// before.
    pub fn with_config(self, config: Config) -> Result<Self, BuilderError> {
        let truncation = config
            .max_seq_len
            .map_or_else(Truncation::none, Truncation::fixed);
        let mut builder = self
            .with_pattern(config.pattern)?
            .with_special_tokens(config.special_tokens)
            .with_mask_prob(config.mask_prob)?
            .with_mask_weights(config.mask_weights)?
            .with_truncation(truncation)?;
        if let Some(start) = config.chem_token_start {
            builder.chem_token_start = Some(start);
        }

        Ok(builder)
    }

    /// Builds the tokenizer.
    pub fn build(self) -> Result<Tokenizer<N>, BuilderError>
    where
        N: FromPrimitive + Copy,
    {
        let pre_tokenizer = match self.pre_tokenizer {
            Some(pre_tokenizer) => pre_tokenizer,
            None => PreTokenizer::new(SMILES_PATTERN)?,
        };
        let vocab = match self.source {
            Source::Corpus(corpus) => {
                let vocab = Vocab::from_corpus(corpus.as_slice(), &pre_tokenizer, self.special)?;
                if let Some(start) = self.chem_token_start {
                    let special = vocab.special().clone();
                    Vocab::from_tokens(vocab.tokens().to_vec(), special, Some(start))?
                } else {
                    vocab
                }
            }
            Source::Tokens(tokens) => {
                Vocab::from_tokens(tokens, self.special, self.chem_token_start)?
            }
        };
        let post_tokenizer = PostTokenizer::new(vocab.special());
        let masking = Masking::new(self.mask_prob, self.mask_weights)?;

        Ok(Tokenizer {
            pre_tokenizer,
            vocab,
            post_tokenizer,
            masking,
            truncation: self.truncation,
            padding: self.padding,
            unknown: Mutex::new(BTreeMap::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use test_utils::smiles::vocab;

    use super::*;

    const CORPUS: [&str; 3] = ["CCO.Ccc", "CCClCCl", "C(=O)CBr"];

    #[test]
    fn test_from_corpus() {
        let tokenizer = Builder::<u32>::from_corpus(&CORPUS).build().unwrap();
        let vocab = tokenizer.vocab();

        assert_eq!(vocab.len(), 15);
        assert_eq!(vocab.get("Br"), Some(14));
        assert_eq!(vocab.chem_tokens(), 6..15);
        assert!((tokenizer.masking().prob() - 0.15).abs() < f64::EPSILON);
        assert!(tokenizer.truncation().max_len().is_none());
    }

    #[test]
    fn test_from_file() {
        let tokenizer = Builder::<i64>::from_file(vocab().unwrap())
            .unwrap()
            .with_chem_token_start(6)
            .build()
            .unwrap();
        let vocab = tokenizer.vocab();

        assert_eq!(vocab.get("C"), Some(6));
        assert_eq!(vocab.get("Br"), Some(14));
        assert_eq!(vocab.sep_id(), 5);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            Builder::<u32>::from_file("missing/vocab.txt").unwrap_err(),
            BuilderError::Io(_),
        ));
    }

    #[test]
    fn test_from_vocab_invalid() {
        let error = Builder::<u32>::from_vocab(Cursor::new("<PAD>\n^\n?\n&\n<MASK>\n<SEP>\nC\n"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(
            error,
            BuilderError::Vocab(VocabError::SpecialToken { id: 1, .. }),
        ));
    }

    #[test]
    fn test_from_vocab_reserved() {
        let tokenizer = Builder::<u16>::from_vocab(Cursor::new(
            "<PAD>\n?\n^\n&\n<MASK>\n<SEP>\n<RESERVED>\nC\nO\n",
        ))
        .unwrap()
        .with_chem_token_start(7)
        .build()
        .unwrap();

        assert_eq!(tokenizer.vocab().chem_tokens(), 7..9);
        assert_eq!(tokenizer.vocab().get("<RESERVED>"), Some(6));
    }

    #[test]
    fn test_chem_token_start_corpus() {
        let tokenizer = Builder::<u32>::from_corpus(&CORPUS)
            .with_chem_token_start(8)
            .build()
            .unwrap();
        assert_eq!(tokenizer.vocab().chem_tokens(), 8..15);

        assert!(matches!(
            Builder::<u32>::from_corpus(&CORPUS)
                .with_chem_token_start(16)
                .build()
                .unwrap_err(),
            BuilderError::Vocab(VocabError::ChemTokenStart { start: 16, len: 15 }),
        ));
    }

    #[test]
    fn test_with_pattern() {
        let tokenizer = Builder::<u32>::from_corpus(&["CCO"])
            .with_pattern("[A-Z]")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            tokenizer.split(&["OC"]).unwrap().concat(),
            vec![Token::from("O"), Token::from("C")],
        );
        assert!(tokenizer.split(&["Cc"]).is_err());

        assert!(matches!(
            Builder::<u32>::from_corpus(&CORPUS)
                .with_pattern("[")
                .unwrap_err(),
            BuilderError::PreTokenizer(PreTokenizerError::Pattern(_)),
        ));
    }

    #[test]
    fn test_with_special_tokens() {
        let special = SpecialTokens {
            unk: "<UNK>".into(),
            ..SpecialTokens::default()
        };
        let tokenizer = Builder::<u32>::from_corpus(&["C?"])
            .with_pattern(r"C|\?")
            .unwrap()
            .with_special_tokens(special)
            .build()
            .unwrap();
        assert_eq!(tokenizer.vocab().get("?"), Some(7));
        assert_eq!(tokenizer.vocab().get("<UNK>"), Some(1));
    }

    #[test]
    fn test_invalid_masking() {
        assert!(matches!(
            Builder::<u32>::from_corpus(&CORPUS)
                .with_mask_prob(2.)
                .unwrap_err(),
            BuilderError::Masking(MaskingError::Probability(_)),
        ));
        assert!(matches!(
            Builder::<u32>::from_corpus(&CORPUS)
                .with_mask_weights(MaskWeights {
                    mask: 0.,
                    random: 0.,
                    keep: 0.,
                })
                .unwrap_err(),
            BuilderError::Masking(MaskingError::Weights(_)),
        ));
    }

    #[test]
    fn test_invalid_truncation() {
        assert!(matches!(
            Builder::<u32>::from_corpus(&CORPUS)
                .with_truncation(Truncation::fixed(0))
                .unwrap_err(),
            BuilderError::Truncation(_),
        ));
    }

    #[test]
    fn test_with_config() {
        let config = serde_json::from_str::<Config>(
            r#"{ "mask_prob": 0.25, "max_seq_len": 64, "chem_token_start": 7 }"#,
        )
        .unwrap();
        let tokenizer = Builder::<u32>::from_corpus(&CORPUS)
            .with_config(config)
            .unwrap()
            .build()
            .unwrap();

        assert!((tokenizer.masking().prob() - 0.25).abs() < f64::EPSILON);
        assert_eq!(tokenizer.truncation().max_len(), Some(64));
        assert_eq!(tokenizer.vocab().chem_tokens(), 7..15);
    }

    #[test]
    fn test_with_config_keeps_chem_token_start() {
        let tokenizer = Builder::<u32>::from_corpus(&CORPUS)
            .with_chem_token_start(7)
            .with_config(Config::default())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(tokenizer.vocab().chem_tokens(), 7..15);
    }

    #[test]
    fn test_with_config_invalid() {
        let config = Config {
            max_seq_len: Some(1),
            ..Config::default()
        };
        assert!(matches!(
            Builder::<u32>::from_corpus(&CORPUS)
                .with_config(config)
                .unwrap_err(),
            BuilderError::Truncation(_),
        ));
    }
}
