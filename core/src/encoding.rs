/// Tolerant text decoding for mod source files
///
/// Workshop content arrives in whatever encoding the author's editor saved:
/// UTF-8 with or without BOM, UTF-16 of either endianness, occasionally
/// Latin-1. Pipeline artifacts are always written back as plain UTF-8.
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Latin1,
}

/// Detects the encoding of raw file bytes from BOM and UTF-8 validity.
pub fn detect_encoding(bytes: &[u8]) -> SourceEncoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return SourceEncoding::Utf8Bom;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return SourceEncoding::Utf16Le;
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return SourceEncoding::Utf16Be;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return SourceEncoding::Utf8;
    }
    SourceEncoding::Latin1
}

/// Reads a source file as text, stripping any BOM.
pub fn read_text_file(path: &Path) -> Result<String, io::Error> {
    let bytes = std::fs::read(path)?;
    decode(&bytes, detect_encoding(&bytes))
}

fn decode(bytes: &[u8], encoding: SourceEncoding) -> Result<String, io::Error> {
    fn invalid(e: impl std::fmt::Display) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    }

    match encoding {
        SourceEncoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(invalid),
        SourceEncoding::Utf8Bom => String::from_utf8(bytes[3..].to_vec()).map_err(invalid),
        SourceEncoding::Utf16Le => {
            let units: Vec<u16> = bytes[2..]
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).map_err(invalid)
        }
        SourceEncoding::Utf16Be => {
            let units: Vec<u16> = bytes[2..]
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).map_err(invalid)
        }
        // Latin-1 bytes map directly onto U+0000..U+00FF.
        SourceEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
    }
}
