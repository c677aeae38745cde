use std::io::prelude::*;
use std::path::Path;

use bstr::io::BufReadExt;
use bstr::ByteSlice;
use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, info};

use super::{open_file, ParseFieldResult, ParseResult};
use crate::segment::OrientedSegment;

/// Undirected adjacency between oriented segments, built from the `L`
/// lines of a GFA file. Every link is stored in both directions.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct LinkIndex {
    adjacency: FnvHashMap<OrientedSegment, FnvHashSet<OrientedSegment>>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, from: OrientedSegment, to: OrientedSegment) {
        self.adjacency
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.adjacency.entry(to).or_default().insert(from);
    }

    /// Segments linked to `segment`. Unknown segments have none.
    pub fn neighbours<'a>(
        &'a self,
        segment: &OrientedSegment,
    ) -> impl Iterator<Item = &'a OrientedSegment> + 'a {
        self.adjacency.get(segment).into_iter().flatten()
    }

    pub fn contains(&self, segment: &OrientedSegment) -> bool {
        self.adjacency.contains_key(segment)
    }

    /// Number of oriented segments with at least one link.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        info!("Loading links from {:?}", path.as_ref());
        let reader = open_file(path)?;
        Self::parse_reader(reader)
    }

    /// Only `L` records with at least five fields are used; anything
    /// else in the file is ignored.
    pub fn parse_reader<B: BufRead>(reader: B) -> ParseResult<Self> {
        let mut links = LinkIndex::new();
        let mut parsed = 0usize;
        let mut skipped = 0usize;

        for line in reader.byte_lines() {
            let line = line?;
            let line = line.to_str_lossy();
            let line = line.trim();
            if !line.starts_with('L') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields[0] != "L" {
                continue;
            }
            match parse_link(&fields) {
                Ok((from, to)) => {
                    links.insert(from, to);
                    parsed += 1;
                }
                Err(err) => {
                    debug!("Skipping link line `{}`: {}", line, err);
                    skipped += 1;
                }
            }
        }

        info!("Found {} links ({} skipped)", parsed, skipped);
        Ok(links)
    }
}

fn parse_link(
    fields: &[&str],
) -> ParseFieldResult<(OrientedSegment, OrientedSegment)> {
    use super::ParseFieldError;
    if fields.len() < 5 {
        return Err(ParseFieldError::MissingFields);
    }
    let from = OrientedSegment::from_fields(fields[1], fields[2])?;
    let to = OrientedSegment::from_fields(fields[3], fields[4])?;
    Ok((from, to))
}
