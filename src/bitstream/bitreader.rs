//! BitReader: reads a packed bitstream, most significant bit first.
//!
//! NOTE: This module can read from any I/O source that supports the read() call. Running
//! out of data is reported as an `UnexpectedEof` error; nothing is ever guessed past the
//! end of the source.
//!

use std::io::{self, Error, ErrorKind, Read};

const BUFFER_SIZE: usize = 64 * 1024;
const EOF_MESSAGE: &str = "Unexpected End Of File";

/// Reads a binary hctree artifact.
#[derive(Debug)]
pub struct BitReader<R> {
    buffer: Vec<u8>,
    cursor: usize,
    bit_index: usize,
    /// Bytes held by buffers that have already been used up.
    consumed: u64,
    source: R,
}

impl<R: Read> BitReader<R> {
    /// Creates a new BitReader. Nothing is read until the first bit is requested.
    pub fn new(source: R) -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            bit_index: 0,
            consumed: 0,
            source,
        }
    }

    /// Check (and refill) buffer. Returns true if we have data, false if there is no more
    fn have_data(&mut self) -> io::Result<bool> {
        // Only try to read more data when the buffer length is equal to the buffer cursor location
        if self.cursor == self.buffer.len() {
            self.consumed += self.buffer.len() as u64;
            self.buffer.resize(BUFFER_SIZE, 0);
            let size = loop {
                match self.source.read(&mut self.buffer) {
                    Ok(size) => break size,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.buffer.clear();
                        self.cursor = 0;
                        return Err(e);
                    }
                }
            };
            // Adjust the buffer if we read less than the buffer size
            self.buffer.truncate(size);
            // Reset the cursor and bit index
            self.cursor = 0;
            self.bit_index = 0;
            // If nothing came back from our read attempt, then we have no more data.
            if size == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Return the next bit (1 or 0).
    pub fn bit(&mut self) -> io::Result<u8> {
        // A zero bit_index means we are about to start a new byte, which may need a refill.
        if self.bit_index == 0 && !self.have_data()? {
            return Err(Error::new(ErrorKind::UnexpectedEof, EOF_MESSAGE));
        }
        let bit = (self.buffer[self.cursor] >> (7 - self.bit_index)) & 1;
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        Ok(bit)
    }

    /// Return *true* if the next bit is 1, *false* if 0, consuming the bit.
    pub fn bool_bit(&mut self) -> io::Result<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Return the next n bits as a big-endian number. Asking for more than 32 bits is an
    /// error and consumes nothing.
    pub fn bint(&mut self, mut n: usize) -> io::Result<u32> {
        if n > 32 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("bint can return at most 32 bits, {} requested", n),
            ));
        }
        let mut result = 0_u64;

        // Finish off a partial byte one bit at a time.
        while n > 0 && self.bit_index > 0 {
            result = result << 1 | self.bit()? as u64;
            n -= 1;
        }
        // Then take as many whole bytes as we can.
        while n >= 8 {
            if !self.have_data()? {
                return Err(Error::new(ErrorKind::UnexpectedEof, EOF_MESSAGE));
            }
            result = result << 8 | self.buffer[self.cursor] as u64;
            self.cursor += 1;
            n -= 8;
        }
        // And whatever bits are left over.
        while n > 0 {
            result = result << 1 | self.bit()? as u64;
            n -= 1;
        }
        Ok(result as u32)
    }

    /// Returns the next 8 bits as a byte. This is a convenience function, and calls bint(8).
    pub fn byte(&mut self) -> io::Result<u8> {
        self.bint(8).map(|byte| byte as u8)
    }

    /// Total bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        (self.consumed + self.cursor as u64) * 8 + self.bit_index as u64
    }

    /// Debugging function. Report current position in the stream as [bytes.bits].
    pub fn loc(&self) -> String {
        let bits = self.bits_read();
        format!("[{}.{}]", bits / 8, bits % 8)
    }
}
