use std::fmt;

/// Status text for a chain that ran to the end without decoding anything
pub const NO_BARCODE_FOUND: &str = "no barcode found";

/// Which primitive produced the codes and which strategy fed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Tag of the producer: the decode primitive's name, or `"ocr"`
    pub tag: String,
    /// Name of the strategy that succeeded
    pub strategy: &'static str,
}

impl Method {
    /// Create a new method tag
    pub fn new(tag: impl Into<String>, strategy: &'static str) -> Self {
        Self {
            tag: tag.into(),
            strategy,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Outcome of one strategy-chain invocation.
///
/// `codes` is non-empty exactly when `method` is set; the constructors are the
/// only way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    codes: Vec<String>,
    method: Option<Method>,
    status: String,
    attempted: Vec<&'static str>,
}

impl DecodeResult {
    /// Successful decode. Falls back to [`DecodeResult::not_found`] when
    /// `codes` is empty.
    pub fn found(codes: Vec<String>, method: Method, attempted: Vec<&'static str>) -> Self {
        if codes.is_empty() {
            return Self::not_found(attempted);
        }
        let status = format!("decoded by {} via {}", method.tag, method.strategy);
        Self {
            codes,
            method: Some(method),
            status,
            attempted,
        }
    }

    /// Every strategy ran and none produced codes
    pub fn not_found(attempted: Vec<&'static str>) -> Self {
        Self::failed(NO_BARCODE_FOUND, attempted)
    }

    /// Empty result with a custom explanation
    pub fn failed(status: impl Into<String>, attempted: Vec<&'static str>) -> Self {
        Self {
            codes: Vec::new(),
            method: None,
            status: status.into(),
            attempted,
        }
    }

    /// Decoded payloads, in the order the primitive returned them
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Producer of the codes, if any
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Human-readable explanation
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Strategy names in the order they ran
    pub fn attempted(&self) -> &[&'static str] {
        &self.attempted
    }

    /// True when at least one code was decoded
    pub fn is_success(&self) -> bool {
        self.method.is_some()
    }
}
