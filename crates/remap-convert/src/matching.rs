use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use remap_config::MatcherConfig;
use remap_core::ClassEntry;
use serde::{Deserialize, Serialize};

use crate::identity::ClassIdentity;

/// One group of a class partition.
///
/// A unique match has exactly one class on each side, an ambiguous match more than one on at
/// least one side, and an unmatched class nothing on the other side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassMatch {
    pub sources: BTreeSet<ClassEntry>,
    pub dests: BTreeSet<ClassEntry>,
}

impl ClassMatch {
    pub fn new(
        sources: impl IntoIterator<Item = ClassEntry>,
        dests: impl IntoIterator<Item = ClassEntry>,
    ) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            dests: dests.into_iter().collect(),
        }
    }

    pub fn pair(source: ClassEntry, dest: ClassEntry) -> Self {
        Self::new([source], [dest])
    }

    pub fn unique_pair(&self) -> Option<(&ClassEntry, &ClassEntry)> {
        if self.sources.len() != 1 || self.dests.len() != 1 {
            return None;
        }
        Some((self.sources.first()?, self.dests.first()?))
    }

    pub fn is_unique(&self) -> bool {
        self.unique_pair().is_some()
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.sources.is_empty() && !self.dests.is_empty() && !self.is_unique()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.dests.is_empty()
    }
}

/// The partition produced by one matching round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMatching {
    unique: BTreeMap<ClassEntry, ClassEntry>,
    unique_dests: BTreeSet<ClassEntry>,
    ambiguous: Vec<ClassMatch>,
    unmatched_sources: BTreeSet<ClassEntry>,
    unmatched_dests: BTreeSet<ClassEntry>,
}

impl ClassMatching {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a partition from saved groups; one-to-one groups become unique matches.
    pub fn from_groups(groups: impl IntoIterator<Item = ClassMatch>) -> Self {
        let mut matching = Self::new();
        for group in groups {
            if let Some((source, dest)) = group.unique_pair() {
                matching.unique.insert(source.clone(), dest.clone());
                matching.unique_dests.insert(dest.clone());
            } else if group.is_ambiguous() {
                matching.ambiguous.push(group);
            } else {
                matching.unmatched_sources.extend(group.sources);
                matching.unmatched_dests.extend(group.dests);
            }
        }
        matching.ambiguous.sort();
        matching
    }

    /// Source class to dest class.
    pub fn unique_matches(&self) -> &BTreeMap<ClassEntry, ClassEntry> {
        &self.unique
    }

    pub fn ambiguous_matches(&self) -> &[ClassMatch] {
        &self.ambiguous
    }

    pub fn unmatched_source_classes(&self) -> &BTreeSet<ClassEntry> {
        &self.unmatched_sources
    }

    pub fn unmatched_dest_classes(&self) -> &BTreeSet<ClassEntry> {
        &self.unmatched_dests
    }

    pub fn is_matched_source(&self, class: &ClassEntry) -> bool {
        self.unique.contains_key(class)
    }

    pub fn is_matched_dest(&self, class: &ClassEntry) -> bool {
        self.unique_dests.contains(class)
    }

    /// Records confirmed pairs. They are taken out of every other group.
    pub fn add_known_matches(&mut self, known: &BTreeMap<ClassEntry, ClassEntry>) {
        for (source, dest) in known {
            self.unmatched_sources.remove(source);
            self.unmatched_dests.remove(dest);
            for group in &mut self.ambiguous {
                group.sources.remove(source);
                group.dests.remove(dest);
            }
            self.unique.insert(source.clone(), dest.clone());
            self.unique_dests.insert(dest.clone());
        }
        for group in std::mem::take(&mut self.ambiguous) {
            if group.is_ambiguous() {
                self.ambiguous.push(group);
            } else {
                self.unmatched_sources.extend(group.sources);
                self.unmatched_dests.extend(group.dests);
            }
        }
    }

    /// Every group, unique pairs first, then ambiguous groups, then unmatched classes.
    pub fn matches(&self) -> Vec<ClassMatch> {
        let mut out: Vec<ClassMatch> = self
            .unique
            .iter()
            .map(|(source, dest)| ClassMatch::pair(source.clone(), dest.clone()))
            .collect();
        out.extend(self.ambiguous.iter().cloned());
        out.extend(
            self.unmatched_sources
                .iter()
                .map(|source| ClassMatch::new([source.clone()], [])),
        );
        out.extend(
            self.unmatched_dests
                .iter()
                .map(|dest| ClassMatch::new([], [dest.clone()])),
        );
        out
    }

    /// The groups a following round searches again: the unmatched classes, then each ambiguous
    /// group on its own.
    pub fn pools(&self) -> Vec<(Vec<ClassEntry>, Vec<ClassEntry>)> {
        let mut pools = vec![(
            self.unmatched_sources.iter().cloned().collect(),
            self.unmatched_dests.iter().cloned().collect(),
        )];
        pools.extend(self.ambiguous.iter().map(|group| {
            (
                group.sources.iter().cloned().collect(),
                group.dests.iter().cloned().collect(),
            )
        }));
        pools
    }

    /// Scores every pair of one pool and sorts the pool's classes into the partition.
    ///
    /// A pair becomes a unique match when each class is the other's only top-scoring candidate.
    /// The remaining classes are grouped along their top-score edges: groups with classes on both
    /// sides are ambiguous, the rest are unmatched.
    pub fn match_pool(
        &mut self,
        sources: &[ClassIdentity],
        dests: &[ClassIdentity],
        config: &MatcherConfig,
    ) {
        let normalization = config.score_normalization;
        let score_row = |source: &ClassIdentity| -> Vec<f64> {
            dests
                .iter()
                .map(|dest| source.score(dest, normalization))
                .collect()
        };
        let scores: Vec<Vec<f64>> = if config.parallel {
            sources.par_iter().map(score_row).collect()
        } else {
            sources.iter().map(score_row).collect()
        };

        let source_tops: Vec<Vec<usize>> = scores
            .iter()
            .map(|row| top_candidates(row.iter().copied()))
            .collect();
        let dest_tops: Vec<Vec<usize>> = (0..dests.len())
            .map(|j| top_candidates(scores.iter().map(|row| row[j])))
            .collect();

        let mut source_done = vec![false; sources.len()];
        let mut dest_done = vec![false; dests.len()];
        for (i, tops) in source_tops.iter().enumerate() {
            if let [j] = tops.as_slice() {
                if dest_tops[*j].as_slice() == [i] {
                    source_done[i] = true;
                    dest_done[*j] = true;
                    self.unique
                        .insert(sources[i].class().clone(), dests[*j].class().clone());
                    self.unique_dests.insert(dests[*j].class().clone());
                }
            }
        }

        // Sources are nodes `0..n`, dests `n..n + m`.
        let n = sources.len();
        let mut groups = DisjointSets::new(n + dests.len());
        for (i, tops) in source_tops.iter().enumerate() {
            for &j in tops {
                if !source_done[i] && !dest_done[j] {
                    groups.union(i, n + j);
                }
            }
        }
        for (j, tops) in dest_tops.iter().enumerate() {
            for &i in tops {
                if !source_done[i] && !dest_done[j] {
                    groups.union(n + j, i);
                }
            }
        }

        let mut components: BTreeMap<usize, ClassMatch> = BTreeMap::new();
        for (i, source) in sources.iter().enumerate() {
            if !source_done[i] {
                components
                    .entry(groups.find(i))
                    .or_insert_with(|| ClassMatch::new([], []))
                    .sources
                    .insert(source.class().clone());
            }
        }
        for (j, dest) in dests.iter().enumerate() {
            if !dest_done[j] {
                components
                    .entry(groups.find(n + j))
                    .or_insert_with(|| ClassMatch::new([], []))
                    .dests
                    .insert(dest.class().clone());
            }
        }
        for group in components.into_values() {
            if group.sources.is_empty() || group.dests.is_empty() {
                self.unmatched_sources.extend(group.sources);
                self.unmatched_dests.extend(group.dests);
            } else {
                self.ambiguous.push(group);
            }
        }
        self.ambiguous.sort();
    }
}

/// Indices holding the highest positive score.
fn top_candidates(scores: impl Iterator<Item = f64>) -> Vec<usize> {
    let mut best = 0.0;
    let mut tops = Vec::new();
    for (idx, score) in scores.enumerate() {
        if score > best {
            best = score;
            tops.clear();
            tops.push(idx);
        } else if score == best && score > 0.0 {
            tops.push(idx);
        }
    }
    tops
}

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        // The smaller root wins so component roots do not depend on union order.
        if a < b {
            self.parent[b] = a;
        } else {
            self.parent[a] = b;
        }
    }
}
