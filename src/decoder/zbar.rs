use super::Decode;
use crate::scratch::{ScratchImage, quiet_output, tool_available};
use image::DynamicImage;
use regex::bytes::Regex;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// `zbarimg` exit status when the image holds no symbol
const ZBAR_NO_SYMBOLS: i32 = 4;

/// One `<data>` element made of CDATA sections (zbar splits a literal `]]>`)
static DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)<data([^>]*)>((?:<!\[CDATA\[.*?\]\]>)*)</data>")
        .expect("constant pattern")
});
static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s-u)<!\[CDATA\[(.*?)\]\]>").expect("constant pattern"));

/// 1D and 2D symbologies through the `zbarimg` command-line tool.
///
/// The tool needs a file, so every call goes through a [`ScratchImage`].
#[derive(Debug, Clone)]
pub struct ZbarDecoder {
    program: String,
    scratch_dir: Option<PathBuf>,
}

impl ZbarDecoder {
    /// Use `program` as given, without checking that it runs
    pub fn new(program: impl Into<String>, scratch_dir: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            scratch_dir,
        }
    }

    /// `zbarimg` from `PATH`, if it runs
    pub fn detect(scratch_dir: Option<PathBuf>) -> Option<Self> {
        tool_available("zbarimg").then(|| Self::new("zbarimg", scratch_dir))
    }
}

impl Decode for ZbarDecoder {
    fn name(&self) -> &str {
        "zbar"
    }

    fn decode(&self, image: &DynamicImage) -> Vec<Vec<u8>> {
        let scratch = match ScratchImage::write(image, self.scratch_dir.as_deref()) {
            Ok(scratch) => scratch,
            Err(err) => {
                warn!(error = %err, "cannot write scratch image for zbarimg");
                return Vec::new();
            }
        };

        let output = quiet_output(
            Command::new(&self.program)
                .args(["--quiet", "--xml"])
                .arg(scratch.path()),
        );
        if let Err(err) = scratch.release() {
            warn!(error = %err, "failed to remove scratch image");
        }

        match output {
            Ok(out) if out.status.success() => parse_zbar_output(&out.stdout),
            Ok(out) if out.status.code() == Some(ZBAR_NO_SYMBOLS) => Vec::new(),
            Ok(out) => {
                debug!(status = ?out.status, "zbarimg failed");
                Vec::new()
            }
            Err(err) => {
                warn!(program = %self.program, error = %err, "cannot run zbarimg");
                Vec::new()
            }
        }
    }
}

/// Payloads from `zbarimg --xml` output, one per `<symbol>`.
///
/// Payloads may span several lines. Symbols zbar reports base64-encoded
/// (binary data) are skipped.
pub fn parse_zbar_output(stdout: &[u8]) -> Vec<Vec<u8>> {
    let mut payloads = Vec::new();
    for data in DATA_RE.captures_iter(stdout) {
        let attrs = data.get(1).map_or(&b""[..], |m| m.as_bytes());
        if contains(attrs, b"base64") {
            debug!("skipping base64-encoded zbar symbol");
            continue;
        }
        let body = data.get(2).map_or(&b""[..], |m| m.as_bytes());
        let payload: Vec<u8> = CDATA_RE
            .captures_iter(body)
            .filter_map(|c| c.get(1))
            .flat_map(|m| m.as_bytes().iter().copied())
            .collect();
        if !payload.is_empty() {
            payloads.push(payload);
        }
    }
    payloads
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
