use std::io::{Read, Write};

use tracing::debug;

use crate::{
    bitmanipulation::{BitReader, BitWriter},
    error::{HuffmanError, Result},
    frequency::FrequencyTable,
    symbol::Symbol,
    tree::HuffmanTree,
};

const LEAF_COUNT_BYTES: usize = 2;
const COUNT_WIDTH_BYTES: usize = 8;

/// Frequency-table header:
/// `[2: leaf count][8: count width W][leaf count x (symbol, W: count)]`,
/// all integers little-endian. Symbols take `S::BITS / 8` bytes.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Header<S: Symbol> {
    pub counts: FrequencyTable<S>,
}

impl<S: Symbol> Header<S> {
    pub(crate) fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        let leaves = u16::try_from(self.counts.len()).map_err(|_| {
            HuffmanError::malformed(format!(
                "{} distinct symbols do not fit the leaf count field",
                self.counts.len()
            ))
        })?;
        let width = count_width(self.counts.max_count());

        writer.write_bytes(&leaves.to_le_bytes())?;
        writer.write_bytes(&(width as u64).to_le_bytes())?;
        for (symbol, count) in self.counts.entries() {
            writer.write_bytes(&le_bytes(symbol.to_bits(), symbol_bytes::<S>()))?;
            writer.write_bytes(&le_bytes(*count, width))?;
        }
        writer.flush()?;

        debug!(leaves, width, bytes = self.size(), "wrote frequency header");
        Ok(())
    }

    pub(crate) fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Header<S>> {
        // Read array size
        let leaves = from_le_bytes(&read_field(reader, LEAF_COUNT_BYTES, "leaf count")?) as usize;
        if leaves > S::alphabet_size() {
            return Err(HuffmanError::malformed(format!(
                "{} leaves for an alphabet of {} symbols",
                leaves,
                S::alphabet_size()
            )));
        }

        let width = from_le_bytes(&read_field(reader, COUNT_WIDTH_BYTES, "count width")?);
        if width > 8 {
            return Err(HuffmanError::malformed(format!(
                "count width of {} bytes",
                width
            )));
        }
        let width = width as usize;

        let mut entries = Vec::with_capacity(leaves);
        for _ in 0..leaves {
            // Read symbol and count
            let bits = from_le_bytes(&read_field(reader, symbol_bytes::<S>(), "symbol")?);
            let symbol = S::from_bits(bits)
                .ok_or_else(|| HuffmanError::malformed("symbol out of range"))?;
            let count = from_le_bytes(&read_field(reader, width, "symbol count")?);
            entries.push((symbol, count));
        }

        debug!(leaves, width, "read frequency header");
        Ok(Header {
            counts: FrequencyTable::from_entries(entries)?,
        })
    }

    /// Serialized length in bytes.
    pub(crate) fn size(&self) -> usize {
        let width = count_width(self.counts.max_count());
        LEAF_COUNT_BYTES + COUNT_WIDTH_BYTES + self.counts.len() * (symbol_bytes::<S>() + width)
    }
}

/// Tree-shape header: the tree in pre-order, one discriminator bit per node,
/// padded to a byte boundary. An empty input has no tree and no bits.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ShapeHeader<S: Symbol> {
    pub tree: Option<HuffmanTree<S>>,
}

impl<S: Symbol> ShapeHeader<S> {
    pub(crate) fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        let start = writer.bytes_written();
        if let Some(tree) = &self.tree {
            tree.write_shape(writer)?;
        }
        writer.flush()?;
        debug!(bytes = writer.bytes_written() - start, "wrote tree shape header");
        Ok(())
    }

    /// Reads the shape of a tree expected to decode `symbols` symbols.
    pub(crate) fn read<R: Read>(reader: &mut BitReader<R>, symbols: u64) -> Result<ShapeHeader<S>> {
        if symbols == 0 {
            return Ok(ShapeHeader { tree: None });
        }
        let tree = HuffmanTree::read_shape(reader)?;
        reader.align();
        Ok(ShapeHeader { tree: Some(tree) })
    }
}

/// Total symbol count prefixed to a tree-shape container, 8 bytes little-endian.
pub(crate) fn write_symbol_count<W: Write>(writer: &mut BitWriter<W>, count: u64) -> Result<()> {
    writer.write_bytes(&count.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_symbol_count<R: Read>(reader: &mut BitReader<R>) -> Result<u64> {
    Ok(from_le_bytes(&read_field(reader, 8, "symbol count")?))
}

/// Smallest number of bytes that can hold `max_count`.
pub(crate) fn count_width(max_count: u64) -> usize {
    (64 - max_count.leading_zeros() as usize + 7) / 8
}

fn symbol_bytes<S: Symbol>() -> usize {
    (S::BITS / 8) as usize
}

fn le_bytes(value: u64, width: usize) -> Vec<u8> {
    value.to_le_bytes()[..width].to_vec()
}

fn from_le_bytes(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn read_field<R: Read>(reader: &mut BitReader<R>, n: usize, field: &str) -> Result<Vec<u8>> {
    reader.read_bytes(n).map_err(|e| match e {
        HuffmanError::TruncatedStream { .. } => {
            HuffmanError::malformed(format!("header ends before the {} field", field))
        }
        e => e,
    })
}

#[cfg(test)]
mod tests {
    use super::{count_width, Header, ShapeHeader};
    use crate::{
        bitmanipulation::{BitReader, BitWriter},
        error::HuffmanError,
        frequency::{count_frequencies, FrequencyTable},
        tree::HuffmanTree,
    };

    fn write_header(header: &Header<u8>) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        header.write(&mut writer).unwrap();
        writer.close().unwrap()
    }

    #[test]
    fn test_encode_header() {
        let header = Header {
            counts: count_frequencies("abacba".as_bytes()),
        };

        let bytes = write_header(&header);

        assert_eq!(
            bytes,
            vec![
                0x03, 0x00, // Number of frequencies
                0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // Count width
                b'c', 0x01, b'b', 0x02, b'a', 0x03
            ]
        );
        assert_eq!(bytes.len(), header.size());
    }

    #[test]
    fn test_decode_header() {
        let encoded = vec![
            0x03, 0x00, // Number of frequencies
            0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // Count width
            b'a', 0x75, 0x0A, b'b', 0x02, 0x00, b'c', 0x01, 0x00,
        ];

        let mut reader = BitReader::new(&encoded[..]);
        let header = Header::<u8>::read(&mut reader).unwrap();
        assert_eq!(
            header,
            Header {
                counts: FrequencyTable::from_entries(vec![(b'a', 2677), (b'b', 2), (b'c', 1)])
                    .unwrap()
            }
        );
    }

    #[test]
    fn empty_header() {
        let header = Header {
            counts: count_frequencies::<u8>(&[]),
        };
        let bytes = write_header(&header);
        assert_eq!(bytes, vec![0; 10]);

        let mut reader = BitReader::new(&bytes[..]);
        assert_eq!(Header::<u8>::read(&mut reader).unwrap(), header);
    }

    #[test]
    fn decoded_header_rebuilds_same_tree() {
        let counts = count_frequencies("she sells sea shells by the sea shore".as_bytes());
        let header = Header {
            counts: counts.clone(),
        };
        let bytes = write_header(&header);

        let mut reader = BitReader::new(&bytes[..]);
        let decoded = Header::<u8>::read(&mut reader).unwrap();
        assert_eq!(
            HuffmanTree::create(&decoded.counts),
            HuffmanTree::create(&counts)
        );
    }

    #[test]
    fn wide_symbols_take_two_bytes() {
        let header = Header {
            counts: count_frequencies(&[0x0102u16, 0x0102]),
        };
        let mut writer = BitWriter::new(Vec::new());
        header.write(&mut writer).unwrap();
        let bytes = writer.close().unwrap();
        assert_eq!(&bytes[10..], &[0x02, 0x01, 0x02]);

        let mut reader = BitReader::new(&bytes[..]);
        assert_eq!(Header::<u16>::read(&mut reader).unwrap(), header);
    }

    #[test]
    fn malformed_headers() {
        let cases: Vec<Vec<u8>> = vec![
            // too short for the leaf count
            vec![0x01],
            // count width of nine bytes
            vec![0x01, 0x00, 0x09, 0, 0, 0, 0, 0, 0, 0, b'a', 1],
            // one leaf announced, none present
            vec![0x01, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0],
            // more leaves than byte values
            vec![0x01, 0x01, 0x01, 0, 0, 0, 0, 0, 0, 0],
            // duplicated symbol
            vec![0x02, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, b'a', 1, b'a', 2],
            // zero count
            vec![0x01, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, b'a', 0],
        ];
        for case in cases {
            let mut reader = BitReader::new(&case[..]);
            assert!(
                matches!(
                    Header::<u8>::read(&mut reader),
                    Err(HuffmanError::MalformedHeader(_))
                ),
                "{:?} should be rejected",
                case
            );
        }
    }

    #[test]
    fn count_widths() {
        assert_eq!(count_width(0), 0);
        assert_eq!(count_width(1), 1);
        assert_eq!(count_width(255), 1);
        assert_eq!(count_width(256), 2);
        assert_eq!(count_width(u64::MAX), 8);
    }

    #[test]
    fn shape_header_is_byte_aligned() {
        let tree = HuffmanTree::create(&count_frequencies("abacba".as_bytes()));
        let header = ShapeHeader { tree };
        let mut writer = BitWriter::new(Vec::new());
        header.write(&mut writer).unwrap();
        writer.write_bytes(&[0xEE]).unwrap();
        let bytes = writer.close().unwrap();
        assert_eq!(bytes.len(), 5);

        let mut reader = BitReader::new(&bytes[..]);
        let decoded = ShapeHeader::<u8>::read(&mut reader, 6).unwrap();
        assert!(decoded
            .tree
            .unwrap()
            .same_shape(header.tree.as_ref().unwrap()));
        assert_eq!(reader.read_bytes(1).unwrap(), vec![0xEE]);
    }

    #[test]
    fn empty_shape_header_has_no_bytes() {
        let header = ShapeHeader::<u8> { tree: None };
        let mut writer = BitWriter::new(Vec::new());
        header.write(&mut writer).unwrap();
        assert!(writer.close().unwrap().is_empty());

        let mut reader = BitReader::new(&[0u8; 0][..]);
        assert_eq!(ShapeHeader::<u8>::read(&mut reader, 0).unwrap(), header);
    }
}
