use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslationPair {
    pub original: String,
    pub translated: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TranslateReport {
    pub pairs: Vec<TranslationPair>,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    /// Names whose response line was absent or blank.
    pub missing: Vec<String>,
}
