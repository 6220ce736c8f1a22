//! The bitstream module forms the I/O subsystem for hctree.
//!
//! Compressed artifacts are a sequence of bits packed most significant bit first. The
//! writer queues bits and hands whole bytes to any `std::io::Write`, zero padding the
//! final partial byte on flush. The reader pulls buffered bytes from any `std::io::Read`
//! and hands them back one bit (or a few bits) at a time.
//!
//! Both halves are strictly sequential: one writer per output, one reader per input.
//!
pub mod bitreader;
pub mod bitwriter;
