use nom::{branch::alt, bytes::complete::tag, combinator::map, IResult};
use serde::{Deserialize, Serialize};

use crate::parser::ParseFieldError;

/// Represents segment orientation/strand
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Orientation {
    Forward,
    Backward,
}

impl Orientation {
    /// Parse an orientation from a single-element, where + is
    /// Forward, - is Backward
    #[inline]
    pub fn from_bytes_plus_minus<T: AsRef<[u8]>>(bs: T) -> Option<Self> {
        match bs.as_ref() {
            b"+" => Some(Orientation::Forward),
            b"-" => Some(Orientation::Backward),
            _ => None,
        }
    }

    #[inline]
    pub fn flip(&self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    #[inline]
    pub fn plus_minus_as_byte(&self) -> u8 {
        match self {
            Self::Forward => b'+',
            Self::Backward => b'-',
        }
    }

    fn parse_suffix(input: &[u8]) -> IResult<&[u8], Self> {
        alt((
            map(tag("+"), |_| Orientation::Forward),
            map(tag("-"), |_| Orientation::Backward),
        ))(input)
    }
}

/// Default orientation is forward
impl Default for Orientation {
    #[inline]
    fn default() -> Orientation {
        Orientation::Forward
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.plus_minus_as_byte() as char)
    }
}

/// A segment name together with the strand it is traversed on, as
/// written in both the link file (`L  12  +  13  -`) and the contig
/// paths file (`12+,13-`).
#[derive(
    Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OrientedSegment {
    pub name: String,
    pub orient: Orientation,
}

impl OrientedSegment {
    pub fn new<S: Into<String>>(name: S, orient: Orientation) -> Self {
        OrientedSegment {
            name: name.into(),
            orient,
        }
    }

    /// Build a segment from the separate name and orientation fields
    /// of a link record.
    pub fn from_fields(
        name: &str,
        orient: &str,
    ) -> Result<Self, ParseFieldError> {
        if name.is_empty() {
            return Err(ParseFieldError::InvalidField("segment name"));
        }
        let orient = Orientation::from_bytes_plus_minus(orient.trim())
            .ok_or(ParseFieldError::OrientationError)?;
        Ok(OrientedSegment::new(name, orient))
    }

    /// Parse a path token such as `141+`, where the last byte is the
    /// strand.
    pub fn parse_token(token: &str) -> Result<Self, ParseFieldError> {
        let token = token.trim();
        if token.len() < 2 {
            return Err(ParseFieldError::MissingFields);
        }
        let (name, suffix) = token.split_at(token.len() - 1);
        let (rest, orient) = Orientation::parse_suffix(suffix.as_bytes())
            .map_err(|_| ParseFieldError::OrientationError)?;
        if !rest.is_empty() {
            return Err(ParseFieldError::OrientationError);
        }
        Ok(OrientedSegment::new(name, orient))
    }

    /// The same segment on the opposite strand.
    pub fn flipped(&self) -> Self {
        OrientedSegment {
            name: self.name.clone(),
            orient: self.orient.flip(),
        }
    }
}

impl std::fmt::Display for OrientedSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.orient)
    }
}

impl std::str::FromStr for OrientedSegment {
    type Err = ParseFieldError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrientedSegment::parse_token(s)
    }
}
