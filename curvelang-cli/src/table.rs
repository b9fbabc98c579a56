//! The opcode reference table printed when the binary is invoked with no
//! source files: one line per recognized character, column-formatted to
//! the terminal width.

use curvelang_core::op_for_char;

/// Every character `op_for_char` maps to something other than a no-op.
/// Digits `1`-`9` all push themselves the same way `0` does, so only `0`
/// is listed; listing all ten would just repeat "push" ten times.
const CHARS: &[char] = &[
    '0', '<', 'W', '>', 'E', 'v', 'S', '^', 'N', '+', '-', '*', '%', '/', ':', 'F', '=', 'p',
    'B', 'n', 'k', 'K', 'r', 's', 'i', 'b', '∑', 'f', 'c', 'o', 'I', 'D', 'd', 'h', ')', '(', '}',
    '{', ']', '[', '!', 'X', '|', '_', '#', 'u', 'U', '"', '\'', '\\', '`', '?', 'R', 'P', 'e',
    '~', 'a', 'O', ';', ',', '.', 'ø', 'j', '§', 'J', '@', '&', '$', 't', 'T', '™', 'τ', 'x', 'C',
    'l', 'q', 'Q', 'M', 'L', 'm', 'w', 'A', 'V', 'H', 'z', 'Z', 'G', 'g', 'Y', 'y', '«', '»', '×',
    '±', '€', '£', '¥',
];

pub fn print_opcode_table() {
    let mut entries: Vec<String> = CHARS
        .iter()
        .map(|&c| format!("{c} {}", op_for_char(c).name()))
        .collect();
    entries.sort();

    let columns_width = terminal_columns();
    let maxlen = entries.iter().map(|s| s.len()).max().unwrap_or(1) + 1;
    let columns = (columns_width / maxlen).max(1);

    for chunk in entries.chunks(columns) {
        let line: String = chunk.iter().map(|s| format!("{:<width$}", s, width = maxlen)).collect();
        println!("{}", line.trim_end());
    }
}

fn terminal_columns() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80)
}
