//! Text encodings a source file may be declared in.

/// Mirrors the original interpreter's `--windows-1252`/`--latin-7` flags,
/// with UTF-8 as the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Windows1252,
    /// ISO-8859-7, the "Greek" 8-bit encoding the upstream `-g` flag
    /// actually selects (named `latin_7` after its CLI flag, not after the
    /// codec it decodes).
    Iso8859_7,
}

impl Encoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        let codec = match self {
            Encoding::Utf8 => encoding_rs::UTF_8,
            Encoding::Windows1252 => encoding_rs::WINDOWS_1252,
            Encoding::Iso8859_7 => encoding_rs::ISO_8859_7,
        };
        let (text, _, _) = codec.decode(bytes);
        text.into_owned()
    }
}
