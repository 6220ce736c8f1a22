use std::ffi::OsString;
use std::{fmt::Display, fmt::Formatter};

use clap::Parser;
use log::{info, LevelFilter};

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    /// The log filter matching this verbosity.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

impl From<u8> for Verbosity {
    fn from(v: u8) -> Self {
        match v {
            0 => Verbosity::Quiet,
            1 => Verbosity::Errors,
            2 => Verbosity::Warnings,
            3 => Verbosity::Info,
            4 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }
}

/// Zip, Unzip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug)]
pub struct HuffOpts {
    /// Name of the file to read
    pub input: String,
    /// Name of the file to create (or overwrite)
    pub output: String,
    /// Compress/Decompress
    pub op_mode: Mode,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl HuffOpts {
    pub fn new(input: impl Into<String>, output: impl Into<String>, op_mode: Mode) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            op_mode,
            verbose: Verbosity::Warnings,
        }
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Huffman code tree file compressor",
    long_about = "
    Compresses (or decompresses) one file into another using a static Huffman code built
    from the byte frequencies of the input. The code tree is stored at the front of the
    compressed file, so decompression needs nothing but the compressed file itself."
)]
pub struct Args {
    /// File to read
    #[clap(value_name = "INFILE")]
    input: String,

    /// File to write
    #[clap(value_name = "OUTFILE")]
    output: String,

    /// Sets verbosity. -v0 is silent, -v5 is chatty. Release builds keep only errors and
    /// warnings, so -v3 and above add nothing there
    #[clap(short = 'v', long = "verbosity", default_value_t = 2)]
    verbosity: u8,
}

/// Put command line information from CLAP into our internal structure.
fn opts_from_args(args: Args, op_mode: Mode) -> HuffOpts {
    HuffOpts {
        input: args.input,
        output: args.output,
        op_mode,
        verbose: Verbosity::from(args.verbosity),
    }
}

/// Parse an explicit argument list. The first item is the program name.
pub fn try_huffopts_from<I, T>(itr: I, op_mode: Mode) -> Result<HuffOpts, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(itr).map(|args| opts_from_args(args, op_mode))
}

/// Parse the process arguments and set the log level. A wrong argument count prints the
/// usage message and exits before any file is touched.
pub fn huffopts_init(op_mode: Mode) -> HuffOpts {
    let opts = opts_from_args(Args::parse(), op_mode);

    log::set_max_level(opts.verbose.level_filter());

    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Reading from {}, writing to {}", opts.input, opts.output);
    opts
}
