use crate::config::TokenPolicy;
use regex::Regex;
use std::sync::LazyLock;

/// Maximal uppercase alphanumeric runs; any other character ends a run
static RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z0-9]+").expect("constant pattern"));

/// Barcode-like tokens in OCR output: uppercase alphanumeric runs whose length
/// fits `policy`, de-duplicated in first-seen order.
///
/// Runs are split at any other character, so `RefA1B2C3D4E5`,
/// `LOT_A1B2C3D4E5` and `A1B2C3D4E5x` all yield `A1B2C3D4E5`.
pub fn extract_tokens(text: &str, policy: TokenPolicy) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for run in RUN_RE.find_iter(text).map(|m| m.as_str()) {
        let len = run.len();
        if len < policy.min_len || len > policy.max_len {
            continue;
        }
        if !tokens.iter().any(|t| t == run) {
            tokens.push(run.to_string());
        }
    }
    tokens
}
