use std::path::PathBuf;

use crate::benchmarker::Layout;
use crate::codecs::{parse_codec_list, Codec};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Passes {
    Compress,
    Decompress,
    Both,
}

impl Passes {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "compress" => Ok(Passes::Compress),
            "decompress" => Ok(Passes::Decompress),
            "both" => Ok(Passes::Both),
            _ => Err(format!("Unsupported mode: {}. [compress, decompress, both]", s)),
        }
    }

    pub fn compress(&self) -> bool {
        *self != Passes::Decompress
    }

    pub fn decompress(&self) -> bool {
        *self != Passes::Compress
    }
}

#[derive(Debug)]
pub struct BenchmarkOptions {
    pub layout: Layout,
    pub codecs: Vec<Codec>,
    pub passes: Passes,
    pub report: Option<PathBuf>,
    pub plot: bool,
    pub progress: bool,
    pub chart_width: usize,
}

impl BenchmarkOptions {
    pub fn new(root: &str, input_dir: &str, input_ext: &str, codecs: &str, mode: &str) -> Result<Self, String> {
        let mut layout = Layout::new(PathBuf::from(root));
        layout.input_dir = PathBuf::from(input_dir);
        layout.input_extension = String::from(input_ext);
        Ok(BenchmarkOptions {
            layout,
            codecs: parse_codec_list(codecs)?,
            passes: Passes::from_str(mode)?,
            report: None,
            plot: true,
            progress: false,
            chart_width: 50,
        })
    }
}
