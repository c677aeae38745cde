//! Readers for the four assembler and binning inputs. Every reader
//! finds contigs through `contig::parse_contig_number`, so a contig is
//! identified the same way in all of them.

pub mod binning;
pub mod error;
pub mod fasta;
pub mod links;
pub mod paths;

pub use self::binning::*;
pub use self::error::*;
pub use self::fasta::*;
pub use self::links::*;
pub use self::paths::*;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Open a file for buffered reading. The handle lives only as long as
/// the reader that consumes it.
pub(crate) fn open_file<P: AsRef<Path>>(path: P) -> ParseResult<BufReader<File>> {
    let file = File::open(path.as_ref())?;
    Ok(BufReader::new(file))
}
