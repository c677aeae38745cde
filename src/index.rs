use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::contig::ContigNumber;
use crate::parser::{ParseError, ParseResult};

/// This is a helper struct for handling serialization of the index
/// as a plain list, since JSON objects can only have string keys.
#[derive(Serialize, Deserialize)]
struct ContigIndexList {
    contigs: Vec<ContigNumber>,
}

/// Bijection between dense node indices, `0..len()`, and assembler
/// contig numbers. Node indices are handed out in the order contigs
/// are first inserted.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ContigIndex {
    pub(crate) number_map: FnvHashMap<ContigNumber, usize>,
    pub(crate) inverse_map: Vec<ContigNumber>,
}

impl ContigIndex {
    pub fn new() -> Self {
        Default::default()
    }

    /// Allocate the next node index for `contig`. Fails if the contig
    /// already has one, since that would break the bijection.
    pub fn insert(&mut self, contig: ContigNumber) -> ParseResult<usize> {
        if self.number_map.contains_key(&contig) {
            return Err(ParseError::NonContiguousContig(contig));
        }
        let ix = self.inverse_map.len();
        self.number_map.insert(contig, ix);
        self.inverse_map.push(contig);
        Ok(ix)
    }

    pub fn len(&self) -> usize {
        self.inverse_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse_map.is_empty()
    }

    pub fn map_contig(&self, contig: ContigNumber) -> Option<usize> {
        self.number_map.get(&contig).copied()
    }

    pub fn inverse_map_index(&self, ix: usize) -> Option<ContigNumber> {
        self.inverse_map.get(ix).copied()
    }

    /// Like `map_contig`, but a miss is an error: every contig
    /// referenced by an input file has to come from the paths file.
    pub fn node_of(&self, contig: ContigNumber) -> ParseResult<usize> {
        self.map_contig(contig)
            .ok_or(ParseError::UnknownContig(contig))
    }

    pub fn contig_of(&self, ix: usize) -> ParseResult<ContigNumber> {
        self.inverse_map_index(ix).ok_or(ParseError::UnknownNode(ix))
    }

    /// `NODE_<n>` name of the node at `ix`.
    pub fn node_name(&self, ix: usize) -> ParseResult<String> {
        self.contig_of(ix).map(|c| c.node_name())
    }

    /// Iterate over `(node index, contig number)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ContigNumber)> + '_ {
        self.inverse_map.iter().copied().enumerate()
    }

    /// Save the index to a JSON file.
    pub fn save_json<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::io::Result<()> {
        use std::{fs::File, io::BufWriter};
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);
        let list = ContigIndexList {
            contigs: self.inverse_map.clone(),
        };
        serde_json::to_writer(writer, &list)?;
        Ok(())
    }

    /// Load an index from a JSON file.
    pub fn load_json<P: AsRef<std::path::Path>>(
        path: P,
    ) -> ParseResult<Self> {
        use std::{fs::File, io::BufReader};
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let list: ContigIndexList = serde_json::from_reader(reader)
            .map_err(std::io::Error::from)?;
        let mut index = ContigIndex::new();
        for contig in list.contigs {
            index.insert(contig)?;
        }
        Ok(index)
    }
}
