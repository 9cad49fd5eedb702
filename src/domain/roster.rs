//! Name set merging.
//!
//! Incoming raw names are merged into an existing roster keyed by their
//! derived [`NameKey`]. A name whose key already exists overwrites the
//! stored spelling, so re-entering a name fixes a typo instead of adding a
//! duplicate.

use std::collections::HashMap;

use super::{Name, NameKey};

/// Merges `incoming` raw names into `existing`, returning the new roster.
///
/// - Existing entries keep their relative order.
/// - New keys are appended in input order.
/// - A key seen again (in `existing` or earlier in `incoming`) has its raw
///   text replaced by the later spelling.
/// - Blank input is skipped.
#[must_use]
pub fn merge_names<I, S>(existing: &[Name], incoming: I) -> Vec<Name>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut merged: Vec<Name> = existing.to_vec();
    let mut positions: HashMap<NameKey, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, name)| (name.key.clone(), i))
        .collect();

    for raw in incoming {
        let Some(name) = Name::parse(raw.as_ref()) else {
            continue;
        };
        if let Some(&i) = positions.get(&name.key) {
            if let Some(slot) = merged.get_mut(i) {
                slot.raw = name.raw;
            }
            continue;
        }
        positions.insert(name.key.clone(), merged.len());
        merged.push(name);
    }
    merged
}

/// Splits a typed block of names into raw entries.
///
/// Accepts one name per line as well as comma or semicolon separated lists.
/// Blank pieces are dropped; whitespace inside a name is left for
/// [`Name::parse`] to normalize.
#[must_use]
pub fn split_name_list(text: &str) -> Vec<String> {
    text.split(['\n', '\r', ',', ';'])
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn roster(raws: &[&str]) -> Vec<Name> {
        merge_names(&[], raws.iter().copied())
    }

    #[test]
    fn diacritic_variants_collapse_to_one_entry() {
        let existing = roster(&["Anna Nováková"]);
        let merged = merge_names(&existing, ["Anna Nováková", "anna   novakova"]);
        assert_eq!(merged.len(), 1);
        let Some(only) = merged.first() else {
            panic!("expected one entry");
        };
        assert_eq!(only.key.as_str(), "anna-novakova");
        assert_eq!(only.raw, "anna novakova");
    }

    #[test]
    fn remerge_is_idempotent_and_last_spelling_wins() {
        let base = roster(&["Petr", "Jana"]);
        let once = merge_names(&base, ["Tomas Dvorak"]);
        let twice = merge_names(&once, ["Tomáš Dvořák"]);
        assert_eq!(twice.len(), 3);
        let dvorak: Vec<_> = twice
            .iter()
            .filter(|n| n.key.as_str() == "tomas-dvorak")
            .collect();
        assert_eq!(dvorak.len(), 1);
        assert_eq!(dvorak.first().map(|n| n.raw.as_str()), Some("Tomáš Dvořák"));
    }

    #[test]
    fn preserves_existing_order_and_appends_new() {
        let base = roster(&["Cyril", "Adam"]);
        let merged = merge_names(&base, ["Bára", "adam", "Dana"]);
        let keys: Vec<&str> = merged.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, ["cyril", "adam", "bara", "dana"]);
        assert_eq!(merged.get(1).map(|n| n.raw.as_str()), Some("adam"));
    }

    #[test]
    fn duplicates_within_incoming_are_merged() {
        let merged = merge_names(&[], ["Eva", "EVA", "  eva "]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.first().map(|n| n.raw.as_str()), Some("eva"));
    }

    #[test]
    fn blank_entries_are_skipped() {
        let merged = merge_names(&[], ["", "   ", "\t", "Olga"]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn input_roster_is_untouched() {
        let base = roster(&["Ivan"]);
        let _ = merge_names(&base, ["IVAN"]);
        assert_eq!(base.first().map(|n| n.raw.as_str()), Some("Ivan"));
    }

    #[test]
    fn split_accepts_lines_commas_and_semicolons() {
        let pieces = split_name_list("Anna\r\nBob, Cecil;  Dan \n\n,");
        assert_eq!(pieces, ["Anna", "Bob", "Cecil", "Dan"]);
    }
}
