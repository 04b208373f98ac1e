use displaydoc::Display;
use log::warn;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// The potential errors of an augmenter.
#[derive(Debug, Display, Error)]
pub enum AugmenterError {
    /// Failed to render the SMILES string `{0}`
    Render(String),
}

/// Renders the SMILES strings of molecules.
///
/// The randomized rendering may fail for rare molecules, the canonical rendering is the fallback.
#[cfg_attr(test, automock)]
pub trait Augmenter {
    /// Renders the molecule with a randomized atom order.
    fn randomize(&self, smiles: &str) -> Result<String, AugmenterError>;

    /// Renders the molecule canonically.
    fn canonicalize(&self, smiles: &str) -> Result<String, AugmenterError>;
}

/// An augmenter which renders the SMILES strings unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Augmenter for Identity {
    fn randomize(&self, smiles: &str) -> Result<String, AugmenterError> {
        Ok(smiles.to_string())
    }

    fn canonicalize(&self, smiles: &str) -> Result<String, AugmenterError> {
        Ok(smiles.to_string())
    }
}

/// Renders the molecule randomized if requested, canonically otherwise.
///
/// Falls back to the canonical rendering with a warning if the randomized rendering fails.
pub(crate) fn render(
    augmenter: &impl Augmenter,
    smiles: &str,
    randomize: bool,
) -> Result<String, AugmenterError> {
    if randomize {
        match augmenter.randomize(smiles) {
            Ok(rendered) => return Ok(rendered),
            Err(error) => warn!("{}, using the canonical rendering instead.", error),
        }
    }

    augmenter.canonicalize(smiles)
}

/// Renders the batch of molecules.
pub(crate) fn render_batch(
    augmenter: &impl Augmenter,
    batch: impl IntoIterator<Item = impl AsRef<str>>,
    randomize: bool,
) -> Result<Vec<String>, AugmenterError> {
    batch
        .into_iter()
        .map(|smiles| render(augmenter, smiles.as_ref(), randomize))
        .collect()
}
