//! Huffman compression.
//!
//! ```
//! use rcompress::{compress_bytes, decompress_bytes, HeaderStrategy};
//!
//! let (packed, report) = compress_bytes(b"AAAAABBBCC", HeaderStrategy::FrequencyTable)?;
//! assert_eq!(report.output_bytes(), packed.len());
//! assert_eq!(decompress_bytes(&packed, HeaderStrategy::FrequencyTable)?, b"AAAAABBBCC");
//! # Ok::<(), rcompress::HuffmanError>(())
//! ```

use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use tracing::info;

pub mod bitmanipulation;
pub mod codec;
pub mod codes;
pub mod config;
mod decoder;
mod encoder;
pub mod error;
pub mod frequency;
mod header;
pub mod image;
pub mod symbol;
pub mod tree;

pub use codec::{HeaderStrategy, SectionSizes};
pub use config::Config;
pub use error::{HuffmanError, Result};
pub use frequency::{count_frequencies, FrequencyTable};
pub use image::{compress_image, decompress_image, PixelBuffer};
pub use symbol::Symbol;

use bitmanipulation::{BitReader, BitWriter};

/// Sizes of one compression run, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionReport {
    pub input_bytes: usize,
    pub header_bytes: usize,
    pub payload_bytes: usize,
}

impl CompressionReport {
    pub fn new(input_bytes: usize, sizes: SectionSizes) -> Self {
        CompressionReport {
            input_bytes,
            header_bytes: sizes.header_bytes,
            payload_bytes: sizes.payload_bytes,
        }
    }

    pub fn output_bytes(&self) -> usize {
        self.header_bytes + self.payload_bytes
    }

    /// Output size as a percentage of the input size, 0 for an empty input.
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.output_bytes() as f64 / self.input_bytes as f64 * 100.0
    }
}

impl fmt::Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input size (in bits)      : {}", self.input_bytes * 8)?;
        writeln!(f, "Compressed size (in bits) : {}", self.output_bytes() * 8)?;
        writeln!(f, "  header                  : {} bytes", self.header_bytes)?;
        writeln!(f, "  payload                 : {} bytes", self.payload_bytes)?;
        write!(f, "Compression ratio         : {:.2} %", self.ratio())
    }
}

pub fn compress_symbols<S: Symbol, W: Write>(
    symbols: &[S],
    strategy: HeaderStrategy,
    sink: W,
) -> Result<(W, CompressionReport)> {
    let mut writer = BitWriter::new(sink);
    let sizes = codec::write_container(symbols, strategy, &mut writer)?;
    let report = CompressionReport::new(symbols.len() * (S::BITS / 8) as usize, sizes);
    Ok((writer.close()?, report))
}

pub fn decompress_symbols<S: Symbol, R: io::Read>(
    source: R,
    strategy: HeaderStrategy,
) -> Result<Vec<S>> {
    codec::read_container(&mut BitReader::new(source), strategy)
}

pub fn compress_bytes(
    input: &[u8],
    strategy: HeaderStrategy,
) -> Result<(Vec<u8>, CompressionReport)> {
    compress_symbols(input, strategy, Vec::new())
}

pub fn decompress_bytes(input: &[u8], strategy: HeaderStrategy) -> Result<Vec<u8>> {
    decompress_symbols(input, strategy)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => HuffmanError::MissingInputFile {
            path: path.to_path_buf(),
            source: e,
        },
        _ => HuffmanError::Io(e),
    })
}

pub fn compress(input: &Path, output: &Path, config: &Config) -> Result<CompressionReport> {
    let symbols = read_input(input)?;
    let sink = BufWriter::new(File::create(output)?);
    let (sink, report) = compress_symbols(&symbols, config.header, sink)?;
    sink.into_inner().map_err(|e| e.into_error())?.sync_all()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        bytes = report.output_bytes(),
        "compressed"
    );
    Ok(report)
}

pub fn decompress(input: &Path, output: &Path, config: &Config) -> Result<usize> {
    let container = read_input(input)?;
    let symbols: Vec<u8> = decompress_symbols(&container[..], config.header)?;

    let mut sink = BufWriter::new(File::create(output)?);
    sink.write_all(&symbols)?;
    sink.flush()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        bytes = symbols.len(),
        "decompressed"
    );
    Ok(symbols.len())
}
