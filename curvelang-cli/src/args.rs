//! Command-line surface, mirroring the original interpreter's flag set.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(group(ArgGroup::new("encoding").args(&["windows_1252", "latin_7"])))]
pub struct Args {
    /// Source files to run, one interpreter invocation per file.
    pub files: Vec<PathBuf>,

    /// Increase logging verbosity; repeatable (warn -> info -> debug -> trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Flush standard output after every write.
    #[arg(short = 'F', long)]
    pub flush: bool,

    /// Disable catch marks: every code exception is fatal.
    #[arg(short = 'e', long = "err-all")]
    pub err_all: bool,

    /// Decode source files as Windows-1252 instead of UTF-8.
    #[arg(short = 'w', long = "windows-1252")]
    pub windows_1252: bool,

    /// Decode source files as ISO-8859-7 instead of UTF-8.
    #[arg(short = 'g', long = "latin-7")]
    pub latin_7: bool,

    /// Load source files in linear mode instead of Hilbert (two-dimensional) mode.
    #[arg(short, long)]
    pub linear: bool,
}

impl Args {
    pub fn encoding(&self) -> curvelang_io::Encoding {
        if self.windows_1252 {
            curvelang_io::Encoding::Windows1252
        } else if self.latin_7 {
            curvelang_io::Encoding::Iso8859_7
        } else {
            curvelang_io::Encoding::Utf8
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
