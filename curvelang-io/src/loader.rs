//! Reads a source file from disk, decodes it under a configurable encoding,
//! and lays it onto a [`curvelang_core::Grid`] in either Hilbert or linear
//! mode.

use crate::text::Encoding;
use curvelang_core::Grid;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// "Hilbert mode": one grid row per source line, the file's last line
/// landing on row `x=0`.
pub fn load_hilbert(path: &Path, encoding: Encoding) -> Result<Grid, LoadError> {
    let bytes = std::fs::read(path)?;
    let text = encoding.decode(&bytes);
    let lines: Vec<String> = text.lines().map(|l| l.to_string()).collect();
    Ok(Grid::from_lines(&lines))
}

/// "Linear mode": the whole file treated as one stream of non-whitespace
/// characters, laid onto the grid in Hilbert curve order.
pub fn load_linear(path: &Path, encoding: Encoding) -> Result<Grid, LoadError> {
    let bytes = std::fs::read(path)?;
    let text = encoding.decode(&bytes);
    let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(Grid::from_linear(&chars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use curvelang_core::hilbert::coord_of;
    use std::io::Write;

    #[test]
    fn hilbert_mode_last_line_is_row_zero() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Xp").unwrap();
        writeln!(f, "23+p").unwrap();
        let grid = load_hilbert(f.path(), Encoding::Utf8).unwrap();
        assert_eq!(grid.get(0, 0), '2');
        assert_eq!(grid.get(0, 1), '3');
    }

    #[test]
    fn linear_mode_strips_whitespace_and_follows_curve_order() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "2 3\n+p").unwrap();
        let grid = load_linear(f.path(), Encoding::Utf8).unwrap();
        let (x0, y0) = coord_of(0, grid.order());
        assert_eq!(grid.get(x0, y0), '2');
        let (x1, y1) = coord_of(1, grid.order());
        assert_eq!(grid.get(x1, y1), '3');
    }

    #[test]
    fn windows_1252_decodes_high_bytes() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        // 0x93 is a left curly quote under CP1252, not valid UTF-8 on its own.
        f.write_all(&[0x93, b'p']).unwrap();
        let grid = load_hilbert(f.path(), Encoding::Windows1252).unwrap();
        assert_eq!(grid.get(0, 1), 'p');
    }
}
