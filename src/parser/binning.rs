use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use super::{open_file, ParseResult};
use crate::contig::parse_contig_number;
use crate::index::ContigIndex;

/// Bin labels that mean "no bin" in the final snapshot.
pub const UNBINNED_LABELS: &[&str] = &["unbinned", "unassigned"];

pub fn is_unbinned_label(label: &str) -> bool {
    UNBINNED_LABELS.contains(&label)
}

/// One binning snapshot: the bin label of every node, or `None` for
/// contigs that the binning file doesn't mention.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct BinAssignment {
    labels: Vec<Option<String>>,
}

impl BinAssignment {
    pub fn unassigned(node_count: usize) -> Self {
        BinAssignment {
            labels: vec![None; node_count],
        }
    }

    pub fn from_labels(labels: Vec<Option<String>>) -> Self {
        BinAssignment { labels }
    }

    pub fn label(&self, node: usize) -> Option<&str> {
        self.labels.get(node).and_then(|l| l.as_deref())
    }

    pub fn set(&mut self, node: usize, label: String) {
        if node >= self.labels.len() {
            self.labels.resize(node + 1, None);
        }
        self.labels[node] = Some(label);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn assigned_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_some()).count()
    }

    /// Read a delimited file where column 0 holds a contig header and
    /// column 1 the bin label. Later rows for the same contig win.
    pub fn parse_file<P: AsRef<Path>>(
        path: P,
        delimiter: u8,
        index: &ContigIndex,
    ) -> ParseResult<Self> {
        info!("Loading binning result from {:?}", path.as_ref());
        let reader = open_file(path)?;
        Self::parse_reader(reader, delimiter, index)
    }

    /// Rows with fewer than two columns, or whose first column has no
    /// contig number, are skipped. A contig number that isn't in
    /// `index` is an error.
    pub fn parse_reader<R: Read>(
        reader: R,
        delimiter: u8,
        index: &ContigIndex,
    ) -> ParseResult<Self> {
        let mut bins = BinAssignment::unassigned(index.len());
        let mut skipped = 0usize;

        for record in binning_reader(reader, delimiter).byte_records() {
            let record = record?;
            let (name, label) = match (field(&record, 0), field(&record, 1)) {
                (Some(name), Some(label)) => (name, label),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let contig = match parse_contig_number(&name) {
                Some(contig) => contig,
                None => {
                    debug!("Skipping binning row for `{}`", name);
                    skipped += 1;
                    continue;
                }
            };
            let node = index.node_of(contig)?;
            bins.set(node, label.into_owned());
        }

        info!(
            "{} of {} contigs are binned ({} rows skipped)",
            bins.assigned_count(),
            bins.len(),
            skipped
        );
        Ok(bins)
    }
}

/// Whether a contig's bin differs between two snapshots. Two missing
/// labels are equal, so a contig unbinned in both is unchanged.
pub fn bin_changed(initial: Option<&str>, final_bin: Option<&str>) -> bool {
    initial != final_bin
}

/// Every label in column 1 of a binning file, duplicates included, in
/// file order. This is the raw input of the palette.
pub fn read_bin_labels<P: AsRef<Path>>(
    path: P,
    delimiter: u8,
) -> ParseResult<Vec<String>> {
    let reader = open_file(path)?;
    read_bin_labels_from(reader, delimiter)
}

pub fn read_bin_labels_from<R: Read>(
    reader: R,
    delimiter: u8,
) -> ParseResult<Vec<String>> {
    let mut labels = Vec::new();
    for record in binning_reader(reader, delimiter).byte_records() {
        let record = record?;
        if let Some(label) = field(&record, 1) {
            labels.push(label.into_owned());
        }
    }
    Ok(labels)
}

/// Field `i` of a row, with invalid UTF-8 replaced.
fn field(record: &csv::ByteRecord, i: usize) -> Option<Cow<'_, str>> {
    record.get(i).map(String::from_utf8_lossy)
}

fn binning_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contig::ContigNumber;
    use crate::parser::ParseError;

    fn index(numbers: &[u64]) -> ContigIndex {
        let mut index = ContigIndex::new();
        for &n in numbers {
            index.insert(ContigNumber(n)).unwrap();
        }
        index
    }

    #[test]
    fn can_parse_binning() {
        let input = "NODE_2_length_100_cov_3,bin_1
NODE_7_length_90_cov_2,bin_2
NODE_5_length_80_cov_1,bin_1
";
        let index = index(&[5, 2, 7, 11]);
        let bins = BinAssignment::parse_reader(input.as_bytes(), b',', &index)
            .unwrap();
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.label(0), Some("bin_1"));
        assert_eq!(bins.label(1), Some("bin_1"));
        assert_eq!(bins.label(2), Some("bin_2"));
        assert_eq!(bins.label(3), None);
        assert_eq!(bins.assigned_count(), 3);
    }

    #[test]
    fn unparseable_rows_are_skipped() {
        let input = "contig\tbin
NODE_1_length_5\tA
lonely
";
        let index = index(&[1]);
        let bins = BinAssignment::parse_reader(input.as_bytes(), b'\t', &index)
            .unwrap();
        assert_eq!(bins.label(0), Some("A"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let input: &[u8] = b"NODE_1_length_5,bin\xff1\nNODE_\xfe2,x\nNODE_2_length_5,b\n";
        let index = index(&[1, 2]);
        let bins = BinAssignment::parse_reader(input, b',', &index).unwrap();
        assert_eq!(bins.label(0), Some("bin\u{FFFD}1"));
        assert_eq!(bins.label(1), Some("b"));

        let labels = read_bin_labels_from(input, b',').unwrap();
        assert_eq!(labels, vec!["bin\u{FFFD}1", "x", "b"]);
    }

    #[test]
    fn unknown_contigs_are_fatal() {
        let input = "NODE_3_length_5,A\n";
        let index = index(&[1]);
        let err = BinAssignment::parse_reader(input.as_bytes(), b',', &index)
            .unwrap_err();
        assert!(matches!(err, ParseError::UnknownContig(ContigNumber(3))));
    }

    #[test]
    fn changed_flag_compares_labels() {
        assert!(!bin_changed(Some("binA"), Some("binA")));
        assert!(bin_changed(Some("binA"), None));
        assert!(bin_changed(None, Some("binA")));
        assert!(!bin_changed(None, None));
        assert!(bin_changed(Some("binA"), Some("binB")));
    }

    #[test]
    fn raw_labels_keep_duplicates() {
        let input = "NODE_1_length_5,b\nNODE_2_length_5,a\nbroken\nNODE_3_length_5,b\n";
        let labels = read_bin_labels_from(input.as_bytes(), b',').unwrap();
        assert_eq!(labels, vec!["b", "a", "b"]);
    }

    #[test]
    fn unbinned_tokens() {
        assert!(is_unbinned_label("unbinned"));
        assert!(is_unbinned_label("unassigned"));
        assert!(!is_unbinned_label("bin_1"));
    }
}
