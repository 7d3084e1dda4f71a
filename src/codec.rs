//! Container layout shared by every symbol type.
//!
//! A container is a header section followed by the bit-packed payload, each
//! section padded to a byte boundary. The header strategy is not recorded in
//! the container: both ends have to agree on it.

use std::io::{Read, Write};

use serde_derive::Deserialize;
use tracing::debug;

use crate::{
    bitmanipulation::{BitReader, BitWriter},
    decoder::HuffmanDecoder,
    encoder::HuffmanEncoder,
    error::{HuffmanError, Result},
    frequency::count_frequencies,
    header::{read_symbol_count, write_symbol_count, Header, ShapeHeader},
    symbol::Symbol,
    tree::HuffmanTree,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderStrategy {
    /// `[2: leaf count][8: count width W][(symbol, W: count)...]`, the tree is
    /// rebuilt from the counts.
    #[default]
    FrequencyTable,
    /// `[8: symbol count][pre-order tree shape]`.
    TreeShape,
}

/// Byte counts of the two sections of a written container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSizes {
    pub header_bytes: usize,
    pub payload_bytes: usize,
}

pub fn write_container<S: Symbol, W: Write>(
    symbols: &[S],
    strategy: HeaderStrategy,
    writer: &mut BitWriter<W>,
) -> Result<SectionSizes> {
    let start = writer.bytes_written();
    let counts = count_frequencies(symbols);
    let tree = HuffmanTree::create(&counts);
    debug!(
        symbols = symbols.len(),
        distinct = counts.len(),
        depth = ?tree.as_ref().map(HuffmanTree::depth),
        "built tree"
    );

    let tree = match strategy {
        HeaderStrategy::FrequencyTable => {
            Header { counts }.write(writer)?;
            tree
        }
        HeaderStrategy::TreeShape => {
            write_symbol_count(writer, symbols.len() as u64)?;
            let header = ShapeHeader { tree };
            header.write(writer)?;
            header.tree
        }
    };
    let header_bytes = writer.bytes_written() - start;

    HuffmanEncoder::new(tree.as_ref()).encode(symbols, writer)?;
    let payload_bytes = writer.bytes_written() - start - header_bytes;

    Ok(SectionSizes {
        header_bytes,
        payload_bytes,
    })
}

pub fn read_container<S: Symbol, R: Read>(
    reader: &mut BitReader<R>,
    strategy: HeaderStrategy,
) -> Result<Vec<S>> {
    let (tree, count) = match strategy {
        HeaderStrategy::FrequencyTable => {
            let header = Header::<S>::read(reader)?;
            (HuffmanTree::create(&header.counts), header.counts.total())
        }
        HeaderStrategy::TreeShape => {
            let count = read_symbol_count(reader)?;
            (ShapeHeader::<S>::read(reader, count)?.tree, count)
        }
    };
    let symbols = HuffmanDecoder::new(tree.as_ref(), count).decode(reader)?;
    expect_end(reader)?;
    Ok(symbols)
}

/// Fails when bytes follow the payload: the header then disagrees with the
/// container length.
pub(crate) fn expect_end<R: Read>(reader: &mut BitReader<R>) -> Result<()> {
    let payload_end = reader.bytes_read();
    if reader.at_end()? {
        return Ok(());
    }
    Err(HuffmanError::malformed(format!(
        "trailing bytes after the payload ending at byte {}",
        payload_end
    )))
}
