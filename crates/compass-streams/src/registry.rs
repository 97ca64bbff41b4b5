//! Checking stream contents against the model's field registry.

use std::collections::{BTreeSet, HashSet};

use crate::model::{StreamEntry, StreamManifest};

/// The set of field, array and struct names a model build defines.
pub trait FieldRegistry {
    fn contains(&self, name: &str) -> bool;
}

impl FieldRegistry for BTreeSet<String> {
    fn contains(&self, name: &str) -> bool {
        BTreeSet::contains(self, name)
    }
}

impl FieldRegistry for HashSet<String> {
    fn contains(&self, name: &str) -> bool {
        HashSet::contains(self, name)
    }
}

impl FieldRegistry for &[&str] {
    fn contains(&self, name: &str) -> bool {
        self.iter().any(|n| *n == name)
    }
}

/// A stream entry naming a field the registry does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedField<'a> {
    pub stream: &'a str,
    pub entry: &'a StreamEntry,
}

impl StreamManifest {
    /// Field entries whose names `registry` does not define, in manifest order.
    /// Embedded stream references are not fields and are never reported.
    pub fn unresolved_fields(&self, registry: &dyn FieldRegistry) -> Vec<UnresolvedField<'_>> {
        self.iter()
            .flat_map(|stream| {
                stream
                    .variables()
                    .filter(move |entry| !registry.contains(entry.name()))
                    .map(move |entry| UnresolvedField {
                        stream: &stream.name,
                        entry,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Stream, StreamType};

    fn manifest() -> StreamManifest {
        let mut out = Stream::new("out", StreamType::Output, "out.nc");
        out.contents = vec![
            StreamEntry::Stream("mesh".to_string()),
            StreamEntry::Var("ssh".to_string()),
            StreamEntry::VarArray("tracers".to_string()),
            StreamEntry::Var("bogus".to_string()),
        ];
        StreamManifest::from_streams(vec![out])
    }

    #[test]
    fn reports_unknown_fields_only() {
        let registry: BTreeSet<String> = ["ssh", "tracers"].iter().map(|s| s.to_string()).collect();
        let manifest = manifest();
        let missing = manifest.unresolved_fields(&registry);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].stream, "out");
        assert_eq!(missing[0].entry.name(), "bogus");
    }

    #[test]
    fn slice_registry() {
        let names: &[&str] = &["ssh", "tracers", "bogus"];
        assert!(manifest().unresolved_fields(&names).is_empty());
    }

    #[test]
    fn empty_registry_reports_every_field() {
        let registry: HashSet<String> = HashSet::new();
        assert_eq!(manifest().unresolved_fields(&registry).len(), 3);
    }
}
