//! Command-line flags shared by the `indexer` and `search` binaries.

use crate::tokenizer::{Normalizer, NormalizerConfig};
use clap::Args;

/// Term normalization switches. Build and query must be run with the same ones.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct NormalizerArgs {
    /// Keep stopwords instead of dropping them
    #[arg(long, default_value_t = false)]
    pub keep_stopwords: bool,
    /// Keep numeric tokens instead of dropping them
    #[arg(long, default_value_t = false)]
    pub keep_numbers: bool,
    /// Keep single-character terms instead of dropping them
    #[arg(long, default_value_t = false)]
    pub keep_singles: bool,
    /// Skip stemming
    #[arg(long, default_value_t = false)]
    pub no_stem: bool,
}

impl From<NormalizerArgs> for Normalizer {
    fn from(args: NormalizerArgs) -> Self {
        Normalizer::new(NormalizerConfig {
            ignore_stopwords: !args.keep_stopwords,
            ignore_numbers: !args.keep_numbers,
            ignore_singles: !args.keep_singles,
            stem: !args.no_stem,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_default_normalizer() {
        let n: Normalizer = NormalizerArgs::default().into();
        assert_eq!(n.config(), NormalizerConfig::default());
    }
}
