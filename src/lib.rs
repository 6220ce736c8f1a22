//! Static Huffman file compression over the 256 byte alphabet.
//!
//! Version 0.1.0
//!
//! A compressed file holds the number of input bytes, the shape of the code tree and then
//! the code of every input byte, all bit packed with no padding until the very end. The
//! tree is built from the byte frequencies of the whole input, so compression reads the
//! input once to count and once to encode.
//!
//! Basic usage is as follows:
//!
//! `$> compress test.txt test.hc`
//!
//! `$> decompress test.hc test.txt`
//!
//! Both programs take exactly an input path and an output path, plus an optional
//! verbosity (`-v0` .. `-v5`).
//!
#![warn(rust_2018_idioms)]

pub mod bitstream;
pub mod compression;
pub mod huffman_coding;
pub mod tools;
