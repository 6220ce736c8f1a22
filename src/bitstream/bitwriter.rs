//! BitWriter: packs bits most significant bit first and writes them to any I/O sink.

use std::io::{self, Write};

use log::error;

/// Buffered bytes are handed to the writer once the buffer grows past this.
const BUFFER_SIZE: usize = 64 * 1024;

/// Writes a bitstream for output.
pub struct BitWriter<W: Write> {
    /// Output buffer of packed bytes not yet handed to the writer.
    output: Vec<u8>,
    /// Private queue to hold bits that are waiting to be put as bytes into the output buffer.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
    /// Count of bytes already handed to the writer.
    written: u64,
    /// Zero bits added by the last flush to complete the final byte.
    padding: u8,
    /// Handle to the output stream
    writer: W,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter over the sink. Call flush() when done, or any queued bits
    /// are lost.
    pub fn new(writer: W) -> Self {
        Self {
            output: Vec::with_capacity(BUFFER_SIZE),
            queue: 0,
            q_bits: 0,
            written: 0,
            padding: 0,
            writer,
        }
    }

    /// Internal bitstream write function common to all out.XX functions.
    fn push_queue(&mut self) -> io::Result<()> {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
        if self.output.len() >= BUFFER_SIZE {
            self.drain()?;
        }
        Ok(())
    }

    /// Hand everything in the output buffer to the writer.
    fn drain(&mut self) -> io::Result<()> {
        self.writer.write_all(&self.output)?;
        self.written += self.output.len() as u64;
        self.output.clear();
        Ok(())
    }

    /// Puts a single bit on the stream.
    pub fn out_bit(&mut self, bit: bool) -> io::Result<()> {
        self.queue <<= 1;
        self.queue |= bit as u64;
        self.q_bits += 1;
        self.push_queue()
    }

    /// Puts a byte on the stream, most significant bit first. The stream need not be
    /// byte aligned.
    pub fn out8(&mut self, data: u8) -> io::Result<()> {
        self.queue <<= 8; //shift queue by one byte
        self.queue |= data as u64; //add the byte to queue
        self.q_bits += 8; //update depth of queue bits
        self.push_queue()
    }

    /// Puts a 32 bit word on the stream in big-endian order.
    pub fn out32(&mut self, data: u32) -> io::Result<()> {
        self.queue <<= 32; //shift queue by bit length
        self.queue |= data as u64; //add data portion to queue
        self.q_bits += 32; //update depth of queue bits
        self.push_queue()
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits, then writes everything buffered and flushes the writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.padding = (8 - self.q_bits % 8) % 8;
        if self.q_bits > 0 {
            self.queue <<= self.padding; //pad the queue with zeros
            self.q_bits += self.padding;
            while self.q_bits > 7 {
                let byte = (self.queue >> (self.q_bits - 8)) as u8;
                self.output.push(byte);
                self.q_bits -= 8;
            }
        }
        self.drain()?;
        self.writer.flush()
    }

    /// Number of pad bits the last flush added.
    pub fn padding(&self) -> u8 {
        self.padding
    }

    /// Total bits put on the stream so far, padding included.
    pub fn bits_written(&self) -> u64 {
        (self.written + self.output.len() as u64) * 8 + self.q_bits as u64
    }

    /// Total whole bytes produced so far. After flush() this is the artifact size.
    pub fn bytes_written(&self) -> u64 {
        self.bits_written() / 8
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        let bits = self.bits_written();
        format!("[{}.{}]", bits / 8, bits % 8)
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        if self.q_bits > 0 || !self.output.is_empty() {
            error!(
                "BitWriter dropped with {} unflushed bits.",
                self.output.len() * 8 + self.q_bits as usize
            );
        }
    }
}
