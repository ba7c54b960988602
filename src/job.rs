use std::ffi::OsString;
use std::fmt::Display;
use std::path::PathBuf;

use serde::Serialize;

use crate::codecs::Codec;
use crate::fstools::output_file_name;
use crate::runner::CommandLine;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Compress,
    Decompress,
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Compress => write!(f, "compression"),
            Mode::Decompress => write!(f, "decompression"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Job {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub codec: Codec,
    pub mode: Mode,
}

impl Job {
    pub fn command(&self) -> CommandLine {
        match self.mode {
            Mode::Compress => self.codec.compress_command(&self.source, &self.destination),
            Mode::Decompress => self.codec.decompress_command(&self.source, &self.destination),
        }
    }
}

/// Every job of one codec in one mode.
#[derive(Clone, Debug)]
pub struct Batch {
    pub codec: Codec,
    pub mode: Mode,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Extension given to each output file, with its dot.
    pub output_extension: String,
    pub files: Vec<OsString>,
}

impl Batch {
    /// The extension the metrics are reported under: the target format when
    /// compressing, the source format when decompressing.
    pub fn format(&self) -> &'static str {
        self.codec.extension()
    }

    pub fn jobs(&self) -> impl Iterator<Item = Job> + '_ {
        self.files.iter().map(|file| Job {
            source: self.input_dir.join(file),
            destination: self.output_dir.join(output_file_name(file, &self.output_extension)),
            codec: self.codec,
            mode: self.mode,
        })
    }
}
