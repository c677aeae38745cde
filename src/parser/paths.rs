use std::io::prelude::*;
use std::path::Path;

use bstr::io::BufReadExt;
use bstr::ByteSlice;
use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, info};

use super::{open_file, ParseError, ParseResult};
use crate::contig::{parse_contig_number, ContigNumber};
use crate::index::ContigIndex;
use crate::segment::OrientedSegment;

/// First and last oriented segment of a contig's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub start: OrientedSegment,
    pub end: OrientedSegment,
}

/// Maps each oriented segment to every contig whose path contains it.
/// Repeat segments can belong to several contigs.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SegmentMembership {
    contigs: FnvHashMap<OrientedSegment, FnvHashSet<ContigNumber>>,
}

impl SegmentMembership {
    pub fn insert(&mut self, segment: OrientedSegment, contig: ContigNumber) {
        self.contigs.entry(segment).or_default().insert(contig);
    }

    /// Contigs containing `segment`, in ascending contig order.
    pub fn contigs_of(&self, segment: &OrientedSegment) -> Vec<ContigNumber> {
        let mut found: Vec<_> = self
            .contigs
            .get(segment)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        found.sort_unstable();
        found
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}

/// Everything recovered from a `contigs.paths` file.
#[derive(Default, Debug, Clone)]
pub struct ContigPaths {
    pub index: ContigIndex,
    pub endpoints: FnvHashMap<ContigNumber, Endpoints>,
    pub membership: SegmentMembership,
}

impl ContigPaths {
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn endpoints_of(&self, contig: ContigNumber) -> Option<&Endpoints> {
        self.endpoints.get(&contig)
    }

    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        info!("Loading contig paths from {:?}", path.as_ref());
        let reader = open_file(path)?;
        Self::parse_reader(reader)
    }

    /// Parse header/path line pairs until a blank header or the end of
    /// the input. A path line ending in `;` continues on the next
    /// line.
    pub fn parse_reader<B: BufRead>(reader: B) -> ParseResult<Self> {
        let mut lines = reader
            .byte_lines()
            .map(|line| line.map(|l| l.to_str_lossy().into_owned()));
        let mut paths = ContigPaths::default();
        let mut current: Option<ContigNumber> = None;
        let mut records = 0usize;

        loop {
            let header = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            if header.trim().is_empty() {
                break;
            }
            let mut path_line = match lines.next() {
                Some(line) => line?,
                None => break,
            };

            while let Some(head) = path_line.trim_end().strip_suffix(';') {
                let next = match lines.next() {
                    Some(line) => line?,
                    None => return Err(ParseError::UnterminatedPath(header)),
                };
                path_line = format!("{},{}", head, next.trim());
            }

            let contig = parse_contig_number(&header)
                .ok_or_else(|| ParseError::invalid_header(&header))?;

            let segments = path_line
                .trim()
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    OrientedSegment::parse_token(s)
                        .map_err(|e| ParseError::InvalidSegment(s.to_string(), e))
                })
                .collect::<ParseResult<Vec<_>>>()?;

            let (first, last) = match (segments.first(), segments.last()) {
                (Some(first), Some(last)) => (first.clone(), last.clone()),
                _ => return Err(ParseError::EmptyPath(header)),
            };

            // Only a change from the previous record starts a new node;
            // the assembler lists both strands of a contig back to back.
            if current != Some(contig) {
                paths.index.insert(contig)?;
                current = Some(contig);
            }

            paths.endpoints.entry(contig).or_insert(Endpoints {
                start: first,
                end: last,
            });

            for segment in segments {
                paths.membership.insert(segment, contig);
            }
            records += 1;
        }

        debug!("Read {} path records", records);
        info!(
            "Found {} contigs over {} oriented segments",
            paths.node_count(),
            paths.membership.len()
        );

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Orientation;

    fn seg(name: &str, orient: Orientation) -> OrientedSegment {
        OrientedSegment::new(name, orient)
    }

    const PATHS: &str = "NODE_1_length_150_cov_10.5
1+,2+
NODE_1_length_150_cov_10.5'
2-,1-
NODE_2_length_90_cov_3
3+;
4-,5+
NODE_2_length_90_cov_3'
5-,4+,3-
";

    #[test]
    fn can_parse_paths() {
        let paths = ContigPaths::parse_reader(PATHS.as_bytes()).unwrap();

        assert_eq!(paths.node_count(), 2);
        assert_eq!(paths.index.contig_of(0).unwrap(), ContigNumber(1));
        assert_eq!(paths.index.contig_of(1).unwrap(), ContigNumber(2));

        let ends = paths.endpoints_of(ContigNumber(1)).unwrap();
        assert_eq!(ends.start, seg("1", Orientation::Forward));
        assert_eq!(ends.end, seg("2", Orientation::Forward));

        let ends = paths.endpoints_of(ContigNumber(2)).unwrap();
        assert_eq!(ends.start, seg("3", Orientation::Forward));
        assert_eq!(ends.end, seg("5", Orientation::Forward));
    }

    #[test]
    fn membership_covers_both_strands() {
        let paths = ContigPaths::parse_reader(PATHS.as_bytes()).unwrap();
        let m = &paths.membership;
        assert_eq!(m.contigs_of(&seg("4", Orientation::Backward)), vec![ContigNumber(2)]);
        assert_eq!(m.contigs_of(&seg("4", Orientation::Forward)), vec![ContigNumber(2)]);
        assert_eq!(m.contigs_of(&seg("2", Orientation::Backward)), vec![ContigNumber(1)]);
        assert!(m.contigs_of(&seg("9", Orientation::Forward)).is_empty());
    }

    #[test]
    fn shared_segments_list_every_contig() {
        let input = "NODE_4_length_10
7+,8+
NODE_9_length_10
8+,6-
";
        let paths = ContigPaths::parse_reader(input.as_bytes()).unwrap();
        assert_eq!(
            paths.membership.contigs_of(&seg("8", Orientation::Forward)),
            vec![ContigNumber(4), ContigNumber(9)]
        );
    }

    #[test]
    fn blank_header_stops_parsing() {
        let input = "NODE_1_length_5
1+

NODE_2_length_5
2+
";
        let paths = ContigPaths::parse_reader(input.as_bytes()).unwrap();
        assert_eq!(paths.node_count(), 1);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let input: &[u8] = b"NODE_3_length_5_cov_\xff
1+,2+
NODE_4_length_5
3+
";
        let paths = ContigPaths::parse_reader(input).unwrap();
        assert_eq!(paths.node_count(), 2);
        assert_eq!(paths.index.contig_of(0).unwrap(), ContigNumber(3));
    }

    #[test]
    fn bad_headers_are_fatal() {
        let input = "contig_1
1+
";
        let err = ContigPaths::parse_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeader(_)));
    }

    #[test]
    fn dangling_continuation_is_fatal() {
        let input = "NODE_1_length_5
1+;
";
        let err = ContigPaths::parse_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedPath(_)));
    }

    #[test]
    fn split_contig_records_are_rejected() {
        let input = "NODE_1_length_5
1+
NODE_2_length_5
2+
NODE_1_length_5'
1-
";
        let err = ContigPaths::parse_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::NonContiguousContig(ContigNumber(1))
        ));
    }

    #[test]
    fn can_parse_paths_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("contigs.paths");
        std::fs::write(&file, PATHS).unwrap();
        let paths = ContigPaths::parse_file(&file).unwrap();
        assert_eq!(paths.node_count(), 2);

        let missing = ContigPaths::parse_file(dir.path().join("nope.paths"));
        assert!(matches!(missing, Err(ParseError::IOError(_))));
    }
}
