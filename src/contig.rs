use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Contig number assigned by the assembler, as found in headers such
/// as `NODE_12_length_3402_cov_8.5`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ContigNumber(pub u64);

impl ContigNumber {
    /// Identifier used for nodes and edges in all outputs.
    pub fn node_name(&self) -> String {
        format!("NODE_{}", self.0)
    }
}

impl std::fmt::Display for ContigNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract the contig number from anything containing
/// `NODE_<digits>_length_`. Used by every reader, so all input files
/// agree on what a contig is.
pub fn parse_contig_number(header: &str) -> Option<ContigNumber> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"NODE_(\d+)_length_").unwrap();
    }
    RE.captures(header)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map(ContigNumber)
}

/// Parse the k-mer coverage from a header containing `_cov_<number>`.
pub fn parse_coverage(header: &str) -> Option<f64> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"_cov_([0-9eE.+-]+)").unwrap();
    }
    RE.captures(header)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_contig_numbers() {
        assert_eq!(
            parse_contig_number("NODE_3_length_120_cov_16.379288"),
            Some(ContigNumber(3))
        );
        assert_eq!(
            parse_contig_number(">NODE_0042_length_9'"),
            Some(ContigNumber(42))
        );
        assert_eq!(parse_contig_number("contig_3_length_120"), None);
        assert_eq!(parse_contig_number("NODE_x_length_120"), None);
        assert_eq!(parse_contig_number("NODE_3_len_120"), None);
    }

    #[test]
    fn coverage_is_optional() {
        assert_eq!(
            parse_coverage("NODE_3_length_120_cov_16.379288"),
            Some(16.379288)
        );
        assert_eq!(parse_coverage("NODE_3_length_120"), None);
        assert_eq!(parse_coverage("NODE_3_length_120_cov_abc"), None);
        assert_eq!(parse_coverage("NODE_3_length_120_cov_1e2"), Some(100.0));
    }

    #[test]
    fn node_names_drop_leading_zeros() {
        assert_eq!(ContigNumber(7).node_name(), "NODE_7");
        let parsed = parse_contig_number("NODE_007_length_1").unwrap();
        assert_eq!(parsed.node_name(), "NODE_7");
    }
}
