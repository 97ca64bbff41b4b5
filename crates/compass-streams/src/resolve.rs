//! Embedded stream references.
//!
//! A `<stream name="mesh"/>` entry inside a stream includes the contents of
//! stream `mesh`. References to streams in the same manifest are inlined by
//! [`StreamManifest::flattened_contents`]; references to streams the model
//! core predeclares stay as [`ResolvedEntry::External`] links.

use std::collections::{HashMap, HashSet};

use crate::error::MalformedManifest;
use crate::model::{Stream, StreamEntry, StreamManifest};

/// One entry of a stream after embedded references are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedEntry<'a> {
    /// A field entry (`var`, `var_array` or `var_struct`).
    Field(&'a StreamEntry),
    /// A stream outside this manifest, included by name.
    External(&'a str),
}

impl StreamManifest {
    /// The contents of `name` with embedded manifest streams inlined.
    ///
    /// Entries keep declaration order. An entry reached twice (for example a
    /// field listed both directly and through an embedded stream) appears
    /// once, at its first position. Returns `None` for an unknown stream.
    pub fn flattened_contents(&self, name: &str) -> Option<Vec<ResolvedEntry<'_>>> {
        let root = self.get(name)?;
        let mut out = Vec::new();
        let mut fields = HashSet::new();
        let mut externals = HashSet::new();
        let mut on_stack = HashSet::from([root.name.as_str()]);
        // (stream, index of its next entry); embeds nest as deep as the file does
        let mut stack: Vec<(&Stream, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (stream, idx) = *frame;
            let Some(entry) = stream.contents.get(idx) else {
                on_stack.remove(stream.name.as_str());
                stack.pop();
                continue;
            };
            frame.1 += 1;
            match entry {
                StreamEntry::Stream(reference) => match self.get(reference) {
                    // A loaded manifest has no cycles; this guards hand-built ones.
                    Some(embedded) => {
                        if on_stack.insert(embedded.name.as_str()) {
                            stack.push((embedded, 0));
                        }
                    }
                    None => {
                        if externals.insert(reference.as_str()) {
                            out.push(ResolvedEntry::External(reference));
                        }
                    }
                },
                field => {
                    if fields.insert(field) {
                        out.push(ResolvedEntry::Field(field));
                    }
                }
            }
        }
        Some(out)
    }
}

/// Verify every embedded reference resolves, and that manifest streams do not
/// embed each other in a cycle.
pub(crate) fn check_references(
    manifest: &StreamManifest,
    is_known: impl Fn(&str) -> bool,
) -> Result<(), MalformedManifest> {
    for stream in manifest {
        for reference in stream.embedded_streams() {
            if !manifest.contains(reference) && !is_known(reference) {
                return Err(MalformedManifest::UnknownStreamReference {
                    stream: stream.name.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }

    let mut search = CycleSearch {
        manifest,
        marks: HashMap::new(),
    };
    for stream in manifest {
        if let Some(cycle) = search.visit(stream) {
            return Err(MalformedManifest::CyclicReference { cycle });
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct CycleSearch<'a> {
    manifest: &'a StreamManifest,
    marks: HashMap<&'a str, Mark>,
}

impl<'a> CycleSearch<'a> {
    /// Depth-first walk from `start`, returning the first cycle found as the
    /// path from the repeated stream back to itself.
    fn visit(&mut self, start: &'a Stream) -> Option<Vec<String>> {
        if self.marks.contains_key(start.name.as_str()) {
            return None;
        }
        let manifest = self.manifest;
        self.marks.insert(&start.name, Mark::InProgress);
        let mut stack: Vec<(&'a Stream, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (stream, idx) = *frame;
            let Some(entry) = stream.contents.get(idx) else {
                self.marks.insert(&stream.name, Mark::Done);
                stack.pop();
                continue;
            };
            frame.1 += 1;
            let StreamEntry::Stream(reference) = entry else {
                continue;
            };
            let Some(next) = manifest.get(reference) else {
                continue;
            };
            match self.marks.get(next.name.as_str()) {
                Some(Mark::Done) => {}
                Some(Mark::InProgress) => {
                    let from = stack
                        .iter()
                        .position(|(s, _)| s.name == next.name)
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[from..].iter().map(|(s, _)| s.name.clone()).collect();
                    cycle.push(next.name.clone());
                    return Some(cycle);
                }
                None => {
                    self.marks.insert(&next.name, Mark::InProgress);
                    stack.push((next, 0));
                }
            }
        }
        None
    }
}
