use std::fmt::Display;
use std::path::Path;

use crate::runner::CommandLine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Codec {
    Png,
    WebP,
    Felics,
    Qoi,
}

impl Codec {
    pub const ALL: [Codec; 4] = [Codec::Png, Codec::WebP, Codec::Felics, Codec::Qoi];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Some(Codec::Png),
            "webp" => Some(Codec::WebP),
            "felics" | "fel" => Some(Codec::Felics),
            "qoi" => Some(Codec::Qoi),
            _ => None,
        }
    }

    /// Extension of the compressed files, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Png => ".png",
            Codec::WebP => ".webp",
            Codec::Felics => ".fel",
            Codec::Qoi => ".qoi",
        }
    }

    pub fn compressed_dir_name(&self) -> String {
        format!("to_{}", self)
    }

    pub fn decompressed_dir_name(&self) -> String {
        format!("from_{}", self)
    }

    pub fn compress_command(&self, source: &Path, destination: &Path) -> CommandLine {
        match self {
            Codec::Png => CommandLine::new("convert")
                .arg(source)
                .arg("-quality").arg("100")
                .arg(destination),
            Codec::WebP => CommandLine::new("cwebp")
                .arg("-lossless")
                .arg(source)
                .arg("-o").arg(destination),
            Codec::Felics => CommandLine::new("cfelics")
                .arg("-i").arg(source)
                .arg("-o").arg(destination),
            // convert picks the qoi writer from the destination extension
            Codec::Qoi => CommandLine::new("convert")
                .arg(source)
                .arg(destination),
        }
    }

    pub fn decompress_command(&self, source: &Path, destination: &Path) -> CommandLine {
        match self {
            Codec::Png | Codec::Qoi => CommandLine::new("convert")
                .arg(source)
                .arg(destination),
            Codec::WebP => CommandLine::new("dwebp")
                .arg(source)
                .arg("-o").arg(destination)
                .arg("-tiff"),
            Codec::Felics => CommandLine::new("dfelics")
                .arg("-i").arg(source)
                .arg("-o").arg(destination),
        }
    }

    /// Programs a pass depends on, paired with the flag that makes them print a version.
    pub fn tools(&self, compress: bool) -> (&'static str, &'static str) {
        match (self, compress) {
            (Codec::Png | Codec::Qoi, _) => ("convert", "-version"),
            (Codec::WebP, true) => ("cwebp", "-version"),
            (Codec::WebP, false) => ("dwebp", "-version"),
            (Codec::Felics, true) => ("cfelics", "--version"),
            (Codec::Felics, false) => ("dfelics", "--version"),
        }
    }
}

impl Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// Parses a comma separated codec list, keeping the order given and dropping repeats.
pub fn parse_codec_list(s: &str) -> Result<Vec<Codec>, String> {
    let mut codecs = vec![];
    for name in s.split(',').filter(|n| !n.trim().is_empty()) {
        match Codec::from_str(name) {
            Some(codec) => {
                if !codecs.contains(&codec) {
                    codecs.push(codec);
                }
            },
            None => {
                let supported: Vec<String> = Codec::ALL.iter().map(|c| c.to_string()).collect();
                return Err(format!("Unsupported codec: {}. [{}]", name.trim(), supported.join(", ")));
            },
        }
    }
    if codecs.is_empty() {
        return Err(String::from("No codecs selected."));
    }
    Ok(codecs)
}
