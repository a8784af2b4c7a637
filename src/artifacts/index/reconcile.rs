use crate::artifacts::index::index_entry::IndexEntry;
use std::collections::HashSet;

/// Merge freshly staged entries into an existing staging list
///
/// Existing entries keep their relative order unless their path is restaged;
/// restaged and new paths are appended in the order given. If `incoming`
/// names the same path twice, the later entry wins. Neither input is mutated.
pub fn reconcile(existing: &[IndexEntry], incoming: &[IndexEntry]) -> Vec<IndexEntry> {
    let incoming_paths = incoming
        .iter()
        .map(|entry| entry.name.as_str())
        .collect::<HashSet<_>>();

    let mut seen = HashSet::new();
    let mut latest = incoming
        .iter()
        .rev()
        .filter(|entry| seen.insert(entry.name.as_str()))
        .collect::<Vec<_>>();
    latest.reverse();

    existing
        .iter()
        .filter(|entry| !incoming_paths.contains(entry.name.as_str()))
        .chain(latest)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object_id::ObjectId;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, id: u8) -> IndexEntry {
        IndexEntry::new(name, ObjectId::from_raw(&[id; 20]), Default::default())
    }

    fn names(entries: &[IndexEntry]) -> Vec<(&str, ObjectId)> {
        entries
            .iter()
            .map(|e| (e.name.as_str(), e.oid.clone()))
            .collect()
    }

    #[test]
    fn restaged_paths_replace_existing_entries() {
        let existing = vec![entry("a", 1), entry("b", 2), entry("c", 3)];
        let incoming = vec![entry("b", 9), entry("d", 4)];

        let merged = reconcile(&existing, &incoming);

        assert_eq!(
            names(&merged),
            vec![
                ("a", ObjectId::from_raw(&[1; 20])),
                ("c", ObjectId::from_raw(&[3; 20])),
                ("b", ObjectId::from_raw(&[9; 20])),
                ("d", ObjectId::from_raw(&[4; 20])),
            ]
        );
        assert_eq!(existing.len(), 3);
        assert_eq!(existing[1].oid, ObjectId::from_raw(&[2; 20]));
    }

    #[test]
    fn most_recent_duplicate_wins() {
        let incoming = vec![entry("x", 1), entry("y", 2), entry("x", 3)];

        let merged = reconcile(&[], &incoming);

        assert_eq!(
            names(&merged),
            vec![
                ("y", ObjectId::from_raw(&[2; 20])),
                ("x", ObjectId::from_raw(&[3; 20])),
            ]
        );
    }

    #[test]
    fn nothing_incoming_keeps_existing() {
        let existing = vec![entry("a", 1)];
        assert_eq!(reconcile(&existing, &[]), existing);
    }
}
