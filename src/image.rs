//! RGB images on top of the byte engine.
//!
//! Decoding and encoding actual image files is left to the caller; this
//! module only sees row-major pixel buffers with three 8-bit channels.
//! Container: `[16 bits height][16 bits width][tree shape, byte-aligned][payload]`.

use std::io::{Read, Write};

use tracing::debug;

use crate::{
    bitmanipulation::{BitReader, BitWriter},
    codec::{expect_end, SectionSizes},
    decoder::HuffmanDecoder,
    encoder::HuffmanEncoder,
    error::{HuffmanError, Result},
    frequency::count_frequencies,
    header::ShapeHeader,
    tree::HuffmanTree,
    CompressionReport,
};

pub const CHANNELS: usize = 3;
const DIMENSION_BITS: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    height: u16,
    width: u16,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(height: u16, width: u16, data: Vec<u8>) -> Result<Self> {
        let expected = channel_count(height, width);
        if data.len() != expected {
            return Err(HuffmanError::InvalidImage(format!(
                "{}x{} RGB image needs {} channel values, got {}",
                height,
                width,
                expected,
                data.len()
            )));
        }
        Ok(PixelBuffer {
            height,
            width,
            data,
        })
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Flat channel values, `[r, g, b, r, g, b, ...]` row by row.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, row: u16, col: u16) -> Option<[u8; CHANNELS]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let at = (row as usize * self.width as usize + col as usize) * CHANNELS;
        Some([self.data[at], self.data[at + 1], self.data[at + 2]])
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

fn channel_count(height: u16, width: u16) -> usize {
    height as usize * width as usize * CHANNELS
}

pub fn write_image<W: Write>(
    image: &PixelBuffer,
    writer: &mut BitWriter<W>,
) -> Result<SectionSizes> {
    let start = writer.bytes_written();
    writer.write_value(image.height as u64, DIMENSION_BITS)?;
    writer.write_value(image.width as u64, DIMENSION_BITS)?;
    writer.flush()?;

    let header = ShapeHeader {
        tree: HuffmanTree::create(&count_frequencies(&image.data)),
    };
    header.write(writer)?;
    let header_bytes = writer.bytes_written() - start;
    HuffmanEncoder::new(header.tree.as_ref()).encode(&image.data, writer)?;
    let payload_bytes = writer.bytes_written() - start - header_bytes;

    debug!(
        height = image.height,
        width = image.width,
        header_bytes,
        payload_bytes,
        "wrote image container"
    );
    Ok(SectionSizes {
        header_bytes,
        payload_bytes,
    })
}

pub fn read_image<R: Read>(reader: &mut BitReader<R>) -> Result<PixelBuffer> {
    let height = read_dimension(reader, "height")?;
    let width = read_dimension(reader, "width")?;
    reader.align();

    let count = channel_count(height, width);
    let header = ShapeHeader::<u8>::read(reader, count as u64)?;
    let data = HuffmanDecoder::new(header.tree.as_ref(), count as u64).decode(reader)?;
    expect_end(reader)?;

    debug!(height, width, "read image container");
    PixelBuffer::new(height, width, data)
}

fn read_dimension<R: Read>(reader: &mut BitReader<R>, name: &str) -> Result<u16> {
    match reader.read_value(DIMENSION_BITS) {
        Ok(value) => Ok(value as u16),
        Err(HuffmanError::TruncatedStream { .. }) => Err(HuffmanError::malformed(format!(
            "image header ends before the {}",
            name
        ))),
        Err(e) => Err(e),
    }
}

pub fn compress_image(image: &PixelBuffer) -> Result<(Vec<u8>, CompressionReport)> {
    let mut writer = BitWriter::new(Vec::new());
    let sizes = write_image(image, &mut writer)?;
    Ok((
        writer.close()?,
        CompressionReport::new(image.data.len(), sizes),
    ))
}

pub fn decompress_image(bytes: &[u8]) -> Result<PixelBuffer> {
    read_image(&mut BitReader::new(bytes))
}
