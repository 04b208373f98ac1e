use std::{io::Result, path::PathBuf};

use crate::{resolve_path, DATA_DIR};

/// Resolves the path to the serialized SMILES vocabulary.
///
/// The vocabulary starts with the special tokens, followed by the tokens of the corpus
/// `["CCO.Ccc", "CCClCCl", "C(=O)CBr"]` in the order they are first seen and a few more chemical
/// tokens.
pub fn vocab() -> Result<PathBuf> {
    resolve_path(&[DATA_DIR, "smiles_v0000", "vocab.txt"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab() {
        assert!(vocab().unwrap().is_file());
    }
}
