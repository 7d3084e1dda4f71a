//! Bit-level I/O.
//!
//! Bits are packed MSB-first: the first bit written to a byte lands in its most
//! significant position, and [`BitReader`] hands them back in the same order.
//! Multi-bit values go through the same path, most significant bit first.

use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};

use crate::error::{HuffmanError, Result};

pub struct BitWriter<W: Write> {
    current: u8,
    filled: u8,
    bytes_written: usize,
    sink: BufWriter<W>,
}

impl<W: Write> BitWriter<W> {
    pub fn new(sink: W) -> Self {
        BitWriter {
            current: 0,
            filled: 0,
            bytes_written: 0,
            sink: BufWriter::new(sink),
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.current |= 0x80 >> self.filled;
        }
        self.filled += 1;
        if self.filled == 8 {
            self.emit()?;
        }
        Ok(())
    }

    pub fn write_bits(&mut self, bits: &[bool]) -> io::Result<()> {
        for bit in bits {
            self.write_bit(*bit)?;
        }
        Ok(())
    }

    /// Writes the lowest `width` bits of `value`, most significant first.
    pub fn write_value(&mut self, value: u64, width: u32) -> io::Result<()> {
        for shift in (0..width).rev() {
            self.write_bit((value >> shift) & 0x01 == 1)?;
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.is_aligned() {
            self.sink.write_all(bytes)?;
            self.bytes_written += bytes.len();
            return Ok(());
        }
        for byte in bytes {
            self.write_value(*byte as u64, 8)?;
        }
        Ok(())
    }

    /// Pads the partial byte with zero bits so the next write starts a new byte.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.filled > 0 {
            self.emit()?;
        }
        Ok(())
    }

    /// Flushes the pending bits and the underlying sink, handing the sink back.
    pub fn close(mut self) -> io::Result<W> {
        self.flush()?;
        self.sink.flush()?;
        self.sink.into_inner().map_err(|e| e.into_error())
    }

    pub fn is_aligned(&self) -> bool {
        self.filled == 0
    }

    /// Complete bytes handed to the sink so far. Pending bits are not counted
    /// until a flush.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    fn emit(&mut self) -> io::Result<()> {
        self.sink.write_all(&[self.current])?;
        self.bytes_written += 1;
        self.current = 0;
        self.filled = 0;
        Ok(())
    }
}

pub struct BitReader<R: Read> {
    index: u8,
    current: u8,
    bytes_read: usize,
    source: BufReader<R>,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        BitReader {
            index: 8,
            current: 0,
            bytes_read: 0,
            source: BufReader::new(source),
        }
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.index > 7 {
            // Read next byte
            match self.next_byte()? {
                Some(byte) => {
                    self.current = byte;
                    self.index = 0;
                }
                None => {
                    return Err(HuffmanError::TruncatedStream {
                        requested: 1,
                        available: 0,
                    })
                }
            }
        }
        let val = (self.current >> (7 - self.index)) & 0x01;
        self.index += 1;
        Ok(val == 1)
    }

    pub fn read_bits(&mut self, n: usize) -> Result<Vec<bool>> {
        let mut bits = Vec::with_capacity(n);
        for available in 0..n {
            match self.read_bit() {
                Ok(bit) => bits.push(bit),
                Err(HuffmanError::TruncatedStream { .. }) => {
                    return Err(HuffmanError::TruncatedStream {
                        requested: n,
                        available,
                    })
                }
                Err(e) => return Err(e),
            }
        }
        Ok(bits)
    }

    pub fn read_value(&mut self, width: u32) -> Result<u64> {
        let mut value = 0u64;
        for bit in self.read_bits(width as usize)? {
            value = (value << 1) | bit as u64;
        }
        Ok(value)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(n);
        for i in 0..n {
            let byte = if self.is_aligned() {
                self.next_byte()?
            } else {
                match self.read_value(8) {
                    Ok(value) => Some(value as u8),
                    Err(HuffmanError::TruncatedStream { available, .. }) => {
                        return Err(HuffmanError::TruncatedStream {
                            requested: n * 8,
                            available: i * 8 + available,
                        })
                    }
                    Err(e) => return Err(e),
                }
            };
            match byte {
                Some(byte) => bytes.push(byte),
                None => {
                    return Err(HuffmanError::TruncatedStream {
                        requested: n * 8,
                        available: i * 8,
                    })
                }
            }
        }
        Ok(bytes)
    }

    /// True once the source has no byte left. The unread bits of a partially
    /// consumed byte are padding and don't count. A byte found here is
    /// consumed, so only call this when nothing else is expected.
    pub fn at_end(&mut self) -> Result<bool> {
        self.index = 8;
        Ok(self.next_byte()?.is_none())
    }

    /// Drops whatever is left of the current byte.
    pub fn align(&mut self) {
        self.index = 8;
    }

    pub fn is_aligned(&self) -> bool {
        self.index > 7
    }

    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0];
        loop {
            match self.source.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.bytes_read += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BitReader, BitWriter};
    use crate::error::HuffmanError;

    #[test]
    fn can_read_from_one_byte() {
        let s: [u8; 1] = [0b10101101];
        let mut reader = BitReader::new(&s[..]);

        assert_eq!(reader.read_bit().unwrap(), true);
        assert_eq!(reader.read_bit().unwrap(), false);
        assert_eq!(reader.read_bit().unwrap(), true);
        assert_eq!(reader.read_bit().unwrap(), false);
        assert_eq!(reader.read_bit().unwrap(), true);
        assert_eq!(reader.read_bit().unwrap(), true);
        assert_eq!(reader.read_bit().unwrap(), false);
        assert_eq!(reader.read_bit().unwrap(), true);
    }

    #[test]
    fn can_read_from_more_bytes() {
        let s: [u8; 2] = [0b10101101, 0b01010101];
        let mut reader = BitReader::new(&s[..]);

        // read first byte
        reader.read_bits(8).unwrap();

        assert_eq!(
            reader.read_bits(8).unwrap(),
            vec![false, true, false, true, false, true, false, true]
        );
        assert_eq!(reader.bytes_read(), 2);
    }

    #[test]
    fn read_empty() {
        let s: [u8; 0] = [];
        let mut reader = BitReader::new(&s[..]);
        assert!(matches!(
            reader.read_bit(),
            Err(HuffmanError::TruncatedStream {
                requested: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn read_past_end_reports_partial_count() {
        let s: [u8; 1] = [0xFF];
        let mut reader = BitReader::new(&s[..]);
        assert!(matches!(
            reader.read_bits(10),
            Err(HuffmanError::TruncatedStream {
                requested: 10,
                available: 8
            })
        ));
    }

    #[test]
    fn read_bytes_past_end_counts_what_was_there() {
        let s: [u8; 2] = [0xAB, 0xCD];
        let mut reader = BitReader::new(&s[..]);
        assert!(matches!(
            reader.read_bytes(4),
            Err(HuffmanError::TruncatedStream {
                requested: 32,
                available: 16
            })
        ));

        let mut reader = BitReader::new(&s[..]);
        reader.read_bits(4).unwrap();
        assert!(matches!(
            reader.read_bytes(2),
            Err(HuffmanError::TruncatedStream {
                requested: 16,
                available: 12
            })
        ));
    }

    #[test]
    fn at_end_ignores_pad_bits_only() {
        let s: [u8; 2] = [0b1010_0000, 0xFF];
        let mut reader = BitReader::new(&s[..]);
        reader.read_bits(3).unwrap();
        assert!(!reader.at_end().unwrap());

        let mut reader = BitReader::new(&s[..]);
        reader.read_bits(11).unwrap();
        assert!(reader.at_end().unwrap());

        let empty: [u8; 0] = [];
        assert!(BitReader::new(&empty[..]).at_end().unwrap());
    }

    #[test]
    fn first_bit_written_is_most_significant() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(&[true, false, true]).unwrap();
        let bytes = writer.close().unwrap();
        assert_eq!(bytes, vec![0b10100000]);
    }

    #[test]
    fn flush_pads_to_byte_boundary() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        assert_eq!(writer.bytes_written(), 0);
        writer.flush().unwrap();
        assert!(writer.is_aligned());
        writer.write_value(0b11, 2).unwrap();
        writer.flush().unwrap();
        // flushing an aligned writer is a no-op
        writer.flush().unwrap();
        assert_eq!(writer.bytes_written(), 2);
        assert_eq!(writer.close().unwrap(), vec![0x80, 0xC0]);
    }

    #[test]
    fn values_are_written_msb_first() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_value(0x0102, 16).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_bytes(&[0xFF]).unwrap();
        assert_eq!(writer.close().unwrap(), vec![0x01, 0x02, 0xFF, 0x80]);
    }

    #[test]
    fn reader_mirrors_writer() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_value(5, 3).unwrap();
        writer.flush().unwrap();
        writer.write_bytes(&[0xAB, 0xCD]).unwrap();
        writer.write_value(0x1FF, 9).unwrap();
        let bytes = writer.close().unwrap();

        let mut reader = BitReader::new(&bytes[..]);
        assert_eq!(reader.read_value(3).unwrap(), 5);
        reader.align();
        assert_eq!(reader.read_bytes(2).unwrap(), vec![0xAB, 0xCD]);
        assert_eq!(reader.read_value(9).unwrap(), 0x1FF);
        // the remaining pad bits are zero
        assert_eq!(reader.read_value(7).unwrap(), 0);
        assert!(reader.read_bit().is_err());
    }
}
