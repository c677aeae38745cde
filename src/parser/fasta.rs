use std::io::prelude::*;
use std::path::Path;

use bstr::io::BufReadExt;
use bstr::ByteSlice;
use log::{debug, info};

use super::{open_file, ParseResult};
use crate::contig::{parse_contig_number, parse_coverage};
use crate::index::ContigIndex;

/// Length, GC content and coverage of one contig sequence.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ContigStats {
    pub length: usize,
    /// `None` for empty sequences.
    pub gc_percent: Option<f64>,
    /// `None` if the header has no parseable `_cov_` value.
    pub coverage: Option<f64>,
}

impl ContigStats {
    pub fn from_record(header: &str, sequence: &[u8]) -> Self {
        let length = sequence.len();
        let gc = sequence
            .iter()
            .filter(|b| matches!(b.to_ascii_uppercase(), b'G' | b'C'))
            .count();
        let gc_percent = if length == 0 {
            None
        } else {
            Some(100.0 * gc as f64 / length as f64)
        };
        ContigStats {
            length,
            gc_percent,
            coverage: parse_coverage(header),
        }
    }
}

/// Per-node sequence attributes from a contigs FASTA file.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SequenceStats {
    stats: Vec<Option<ContigStats>>,
}

impl SequenceStats {
    pub fn empty(node_count: usize) -> Self {
        SequenceStats {
            stats: vec![None; node_count],
        }
    }

    pub fn get(&self, node: usize) -> Option<&ContigStats> {
        self.stats.get(node).and_then(|s| s.as_ref())
    }

    /// Sequence length, 0 for contigs missing from the FASTA file.
    pub fn length(&self, node: usize) -> usize {
        self.get(node).map(|s| s.length).unwrap_or(0)
    }

    pub fn gc_percent(&self, node: usize) -> Option<f64> {
        self.get(node).and_then(|s| s.gc_percent)
    }

    pub fn coverage(&self, node: usize) -> Option<f64> {
        self.get(node).and_then(|s| s.coverage)
    }

    pub fn found_count(&self) -> usize {
        self.stats.iter().filter(|s| s.is_some()).count()
    }

    fn record(
        &mut self,
        header: &str,
        sequence: &[u8],
        index: &ContigIndex,
    ) -> bool {
        let node = match parse_contig_number(header)
            .and_then(|contig| index.map_contig(contig))
        {
            Some(node) => node,
            None => {
                debug!("Skipping FASTA record `{}`", header);
                return false;
            }
        };
        if node >= self.stats.len() {
            self.stats.resize(node + 1, None);
        }
        self.stats[node] = Some(ContigStats::from_record(header, sequence));
        true
    }

    pub fn parse_file<P: AsRef<Path>>(
        path: P,
        index: &ContigIndex,
    ) -> ParseResult<Self> {
        info!("Loading contig sequences from {:?}", path.as_ref());
        let reader = open_file(path)?;
        Self::parse_reader(reader, index)
    }

    /// Records whose header has no contig number, or a contig number
    /// the index doesn't know, are skipped.
    pub fn parse_reader<B: BufRead>(
        reader: B,
        index: &ContigIndex,
    ) -> ParseResult<Self> {
        let mut stats = SequenceStats::empty(index.len());
        let mut header: Option<String> = None;
        let mut sequence: Vec<u8> = Vec::new();
        let mut skipped = 0usize;

        for line in reader.byte_lines() {
            let line = line?;
            let line = line.trim_with(|c| c.is_ascii_whitespace());
            if line.first() == Some(&b'>') {
                if let Some(name) = header.take() {
                    if !stats.record(&name, &sequence, index) {
                        skipped += 1;
                    }
                }
                header = Some(line[1..].to_str_lossy().into_owned());
                sequence.clear();
            } else if header.is_some() {
                sequence.extend_from_slice(line);
            }
        }
        if let Some(name) = header.take() {
            if !stats.record(&name, &sequence, index) {
                skipped += 1;
            }
        }

        info!(
            "Found sequences for {} of {} contigs ({} records skipped)",
            stats.found_count(),
            index.len(),
            skipped
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contig::ContigNumber;

    fn index(numbers: &[u64]) -> ContigIndex {
        let mut index = ContigIndex::new();
        for &n in numbers {
            index.insert(ContigNumber(n)).unwrap();
        }
        index
    }

    #[test]
    fn gc_content() {
        let stats = ContigStats::from_record("NODE_1_length_8", b"GGCCAATT");
        assert_eq!(stats.length, 8);
        assert_eq!(stats.gc_percent, Some(50.0));

        let stats = ContigStats::from_record("NODE_1_length_0", b"");
        assert_eq!(stats.length, 0);
        assert_eq!(stats.gc_percent, None);

        let lower = ContigStats::from_record("NODE_1_length_4", b"gcat");
        assert_eq!(lower.gc_percent, Some(50.0));
    }

    #[test]
    fn can_parse_fasta() {
        let input = ">NODE_3_length_12_cov_16.379288
GGCC
AATT
ggcc
>NODE_1_length_4
ATAT
>NODE_99_length_4_cov_2
GGGG
>not_a_contig
CC
";
        let index = index(&[1, 3, 5]);
        let stats = SequenceStats::parse_reader(input.as_bytes(), &index).unwrap();

        assert_eq!(stats.length(1), 12);
        assert_eq!(stats.gc_percent(1), Some(100.0 * 8.0 / 12.0));
        assert_eq!(stats.coverage(1), Some(16.379288));

        assert_eq!(stats.length(0), 4);
        assert_eq!(stats.gc_percent(0), Some(0.0));
        assert_eq!(stats.coverage(0), None);

        assert_eq!(stats.length(2), 0);
        assert_eq!(stats.gc_percent(2), None);
        assert!(stats.get(2).is_none());
        assert_eq!(stats.found_count(), 2);
    }

    #[test]
    fn empty_records_have_no_gc() {
        let input = ">NODE_1_length_0_cov_1.5\n>NODE_2_length_2\nAC\n";
        let index = index(&[1, 2]);
        let stats = SequenceStats::parse_reader(input.as_bytes(), &index).unwrap();
        assert_eq!(stats.length(0), 0);
        assert_eq!(stats.gc_percent(0), None);
        assert_eq!(stats.coverage(0), Some(1.5));
        assert_eq!(stats.gc_percent(1), Some(50.0));
    }

    #[test]
    fn lines_are_trimmed_and_decoded_lossily() {
        let input: &[u8] = b">NODE_1_length_4_cov_2.0 \xff\r\n  GGAT \r\n\tCC\n";
        let index = index(&[1]);
        let stats = SequenceStats::parse_reader(input, &index).unwrap();
        assert_eq!(stats.length(0), 6);
        assert_eq!(stats.gc_percent(0), Some(400.0 / 6.0));
        assert_eq!(stats.coverage(0), Some(2.0));
    }
}
