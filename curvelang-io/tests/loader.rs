use curvelang_io::{load_hilbert, load_linear, Encoding};
use std::io::Write;

#[test]
fn hilbert_and_linear_modes_agree_on_character_content() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "5Z").unwrap();
    writeln!(f, "ppppp").unwrap();

    let hilbert = load_hilbert(f.path(), Encoding::Utf8).unwrap();
    let mut seen: Vec<char> = Vec::new();
    for x in 0..hilbert.side() {
        for y in 0..hilbert.side() {
            let c = hilbert.get(x, y);
            if c != ' ' {
                seen.push(c);
            }
        }
    }
    seen.sort_unstable();

    let linear = load_linear(f.path(), Encoding::Utf8).unwrap();
    let mut seen_linear: Vec<char> = Vec::new();
    for x in 0..linear.side() {
        for y in 0..linear.side() {
            let c = linear.get(x, y);
            if c != ' ' {
                seen_linear.push(c);
            }
        }
    }
    seen_linear.sort_unstable();

    assert_eq!(seen, seen_linear);
}

#[test]
fn missing_file_reports_an_io_error() {
    let result = load_hilbert(std::path::Path::new("/nonexistent/does-not-exist"), Encoding::Utf8);
    assert!(result.is_err());
}
