//Enable more cargo lint tests
#![warn(rust_2018_idioms)]

use hctree::compression::compress::compress;
use hctree::tools::cli::{huffopts_init, Mode};

use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> Result<(), std::io::Error> {
    // Available log levels are Error, Warn, Info, Debug, Trace. The command line narrows this.
    TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let options = huffopts_init(Mode::Zip);
    let result = compress(&options);

    info!("Done.\n");
    result
}
