use std::fmt;

use serde::{Deserialize, Serialize};

/// Which output stream of a script a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}

/// One line of captured script output, tagged with its stream.
///
/// `text` never contains the trailing newline (or `\r\n`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

impl OutputLine {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stderr,
            text: text.into(),
        }
    }

    /// Decode one raw line without its `\n`. A trailing `\r` is dropped and
    /// invalid UTF-8 is replaced rather than rejected.
    pub fn from_raw(stream: OutputStream, bytes: &[u8]) -> Self {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        Self {
            stream,
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn is_stderr(&self) -> bool {
        self.stream == OutputStream::Stderr
    }
}
