use std::collections::{BTreeMap, BTreeSet};

use remap_core::ClassEntry;
use serde::{Deserialize, Serialize};

use crate::error::ConvertError;
use crate::matching::{ClassMatch, ClassMatching};

/// The saved state of a matching session: every class of both versions in exactly one group.
///
/// One-sided groups are kept as single classes, so each unmatched class is its own group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMatches {
    matches: BTreeSet<ClassMatch>,
}

impl ClassMatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassMatch> {
        self.matches.iter()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Adds a group. Classes already in another group are moved out of it first.
    pub fn add(&mut self, group: ClassMatch) {
        for source in &group.sources {
            self.remove_source(source);
        }
        for dest in &group.dests {
            self.remove_dest(dest);
        }
        self.insert(group);
    }

    fn insert(&mut self, group: ClassMatch) {
        if group.sources.is_empty() || group.dests.is_empty() {
            for source in group.sources {
                self.matches.insert(ClassMatch::new([source], []));
            }
            for dest in group.dests {
                self.matches.insert(ClassMatch::new([], [dest]));
            }
        } else {
            self.matches.insert(group);
        }
    }

    pub fn match_by_source(&self, class: &ClassEntry) -> Option<&ClassMatch> {
        self.matches.iter().find(|group| group.sources.contains(class))
    }

    pub fn match_by_dest(&self, class: &ClassEntry) -> Option<&ClassMatch> {
        self.matches.iter().find(|group| group.dests.contains(class))
    }

    pub fn contains_source(&self, class: &ClassEntry) -> bool {
        self.match_by_source(class).is_some()
    }

    pub fn contains_dest(&self, class: &ClassEntry) -> bool {
        self.match_by_dest(class).is_some()
    }

    /// Takes `class` out of its group. The rest of the group stays together.
    pub fn remove_source(&mut self, class: &ClassEntry) {
        if let Some(mut group) = self.match_by_source(class).cloned() {
            self.matches.remove(&group);
            group.sources.remove(class);
            self.insert(group);
        }
    }

    pub fn remove_dest(&mut self, class: &ClassEntry) {
        if let Some(mut group) = self.match_by_dest(class).cloned() {
            self.matches.remove(&group);
            group.dests.remove(class);
            self.insert(group);
        }
    }

    pub fn unique_matches(&self) -> BTreeMap<ClassEntry, ClassEntry> {
        self.matches
            .iter()
            .filter_map(ClassMatch::unique_pair)
            .map(|(source, dest)| (source.clone(), dest.clone()))
            .collect()
    }

    pub fn ambiguous_matches(&self) -> impl Iterator<Item = &ClassMatch> {
        self.matches.iter().filter(|group| group.is_ambiguous())
    }

    pub fn unmatched_source_classes(&self) -> BTreeSet<ClassEntry> {
        self.matches
            .iter()
            .filter(|group| group.dests.is_empty())
            .flat_map(|group| group.sources.iter().cloned())
            .collect()
    }

    pub fn unmatched_dest_classes(&self) -> BTreeSet<ClassEntry> {
        self.matches
            .iter()
            .filter(|group| group.sources.is_empty())
            .flat_map(|group| group.dests.iter().cloned())
            .collect()
    }

    /// The same partition in the form a matching round consumes.
    pub fn to_matching(&self) -> ClassMatching {
        ClassMatching::from_groups(self.matches.iter().cloned())
    }

    pub fn to_json(&self) -> Result<String, ConvertError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ConvertError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl From<&ClassMatching> for ClassMatches {
    fn from(matching: &ClassMatching) -> Self {
        let mut matches = ClassMatches::new();
        for group in matching.matches() {
            matches.insert(group);
        }
        matches
    }
}

impl FromIterator<ClassMatch> for ClassMatches {
    fn from_iter<I: IntoIterator<Item = ClassMatch>>(iter: I) -> Self {
        let mut matches = ClassMatches::new();
        for group in iter {
            matches.add(group);
        }
        matches
    }
}
