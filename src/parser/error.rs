use std::{error, fmt};

use crate::contig::ContigNumber;

pub type ParseFieldResult<T> = Result<T, ParseFieldError>;
pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFieldError {
    /// Attempted to parse an orientation that wasn't + or -.
    OrientationError,
    /// A required field was incorrectly formatted. Includes the field
    /// name.
    InvalidField(&'static str),
    MissingFields,
}

impl fmt::Display for ParseFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseFieldError as PFE;
        match self {
            PFE::OrientationError => {
                write!(f, "Failed to parse an orientation character")
            }
            PFE::InvalidField(field) => {
                write!(f, "Failed to parse field `{}`", field)
            }
            PFE::MissingFields => write!(f, "Line is missing required fields"),
        }
    }
}

impl error::Error for ParseFieldError {}

/// Errors that abort a run. Records that can be skipped (short link
/// lines, unlabelled binning rows, unmappable FASTA records) never
/// produce one of these.
#[derive(Debug)]
pub enum ParseError {
    /// A header line did not contain `NODE_<n>_length_`.
    InvalidHeader(String),
    /// A path token was not a segment name followed by + or -.
    InvalidSegment(String, ParseFieldError),
    /// A path record had no segments.
    EmptyPath(String),
    /// The file ended while a path was still being continued with `;`.
    UnterminatedPath(String),
    /// A contig number showed up again after other contigs had been
    /// listed in between.
    NonContiguousContig(ContigNumber),
    /// A contig number that isn't in the paths file.
    UnknownContig(ContigNumber),
    /// A node index outside the graph.
    UnknownNode(usize),
    /// Wrapper for a delimited-file error.
    Csv(csv::Error),
    /// Wrapper for an IO error.
    IOError(std::io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseError as PE;
        match self {
            PE::InvalidHeader(line) => write!(
                f,
                "Could not parse a contig number (NODE_<n>_length_) from `{}`",
                line
            ),
            PE::InvalidSegment(token, err) => {
                write!(f, "Invalid path segment `{}`: {}", token, err)
            }
            PE::EmptyPath(header) => {
                write!(f, "Path for `{}` has no segments", header)
            }
            PE::UnterminatedPath(header) => write!(
                f,
                "Path for `{}` ends with `;` but the file ends",
                header
            ),
            PE::NonContiguousContig(contig) => write!(
                f,
                "Contig {} appears again after other contigs; paths for one contig must be listed together",
                contig
            ),
            PE::UnknownContig(contig) => {
                write!(f, "Contig {} is not present in the paths file", contig)
            }
            PE::UnknownNode(ix) => write!(f, "No node with index {}", ix),
            PE::Csv(err) => write!(f, "Delimited file error: {}", err),
            PE::IOError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl From<std::io::Error> for ParseError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::IOError(err)
    }
}

impl From<csv::Error> for ParseError {
    #[inline]
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ParseError::InvalidSegment(_, err) => Some(err),
            ParseError::Csv(err) => Some(err),
            ParseError::IOError(err) => Some(err),
            _ => None,
        }
    }
}

impl ParseError {
    #[inline]
    pub(crate) fn invalid_header(line: &str) -> Self {
        Self::InvalidHeader(line.trim_end().to_string())
    }
}
