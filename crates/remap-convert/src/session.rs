use remap_config::MatcherConfig;
use remap_core::ClassEntry;
use remap_index::PackageIndex;
use remap_scheduler::{CancellationToken, Cancelled};

use crate::identity::MatchPhase;
use crate::matcher::{ClassMatcher, MatchReport};
use crate::matches::ClassMatches;
use crate::matching::ClassMatch;
use crate::namer::ClassNamer;

/// An editable class matching between two package versions.
///
/// Manual pairings are kept fixed by later automatic rounds.
#[derive(Debug, Clone)]
pub struct MatchingSession<'a> {
    matcher: ClassMatcher<'a>,
    matches: ClassMatches,
    rounds: usize,
}

impl<'a> MatchingSession<'a> {
    /// A session where nothing is matched yet.
    pub fn new(source: &'a PackageIndex, dest: &'a PackageIndex, config: &'a MatcherConfig) -> Self {
        Self::resume(source, dest, config, ClassMatches::new())
    }

    /// Continues from saved matches. Classes the saved state does not mention start unmatched;
    /// groups naming classes that no longer exist are dropped.
    pub fn resume(
        source: &'a PackageIndex,
        dest: &'a PackageIndex,
        config: &'a MatcherConfig,
        saved: ClassMatches,
    ) -> Self {
        let mut matches = ClassMatches::new();
        for group in saved.iter() {
            let known = group.sources.iter().all(|class| source.contains_obf_class(class))
                && group.dests.iter().all(|class| dest.contains_obf_class(class));
            if known {
                matches.add(group.clone());
            } else {
                tracing::debug!(
                    target = "remap.convert",
                    sources = group.sources.len(),
                    dests = group.dests.len(),
                    "dropping saved match group with unknown classes"
                );
            }
        }
        for class in source.obf_class_entries() {
            if !matches.contains_source(class) {
                matches.add(ClassMatch::new([class.clone()], []));
            }
        }
        for class in dest.obf_class_entries() {
            if !matches.contains_dest(class) {
                matches.add(ClassMatch::new([], [class.clone()]));
            }
        }
        Self {
            matcher: ClassMatcher::new(source, dest, config),
            matches,
            rounds: 0,
        }
    }

    pub fn matches(&self) -> &ClassMatches {
        &self.matches
    }

    pub fn into_matches(self) -> ClassMatches {
        self.matches
    }

    /// Pairs `source` with `dest`, taking both out of their current groups.
    pub fn force_match(&mut self, source: &ClassEntry, dest: &ClassEntry) {
        self.matches
            .add(ClassMatch::pair(source.clone(), dest.clone()));
        tracing::debug!(
            target = "remap.convert",
            source = %source,
            dest = %dest,
            "forced class match"
        );
    }

    /// Takes `source` out of its group. A former unique partner becomes unmatched too.
    pub fn unmatch(&mut self, source: &ClassEntry) {
        if self.matches.contains_source(source) {
            self.matches.add(ClassMatch::new([source.clone()], []));
        }
    }

    /// One more reference-aware round over the unmatched and ambiguous classes.
    pub fn run_round(&mut self) -> MatchReport {
        let current = self.matches.to_matching();
        let unique_before = current.unique_matches().len();
        let next = self.matcher.round(
            MatchPhase::References,
            current.unique_matches(),
            &current.pools(),
        );
        self.rounds += 1;
        let report = MatchReport::new(self.rounds, MatchPhase::References, unique_before, &next);
        self.matches = ClassMatches::from(&next);
        report
    }

    /// Recomputes the whole matching, keeping the current unique pairs fixed.
    pub fn auto_match(&mut self, token: &CancellationToken) -> Result<Vec<MatchReport>, Cancelled> {
        let known = self.matches.unique_matches();
        let mut outcome = self.matcher.compute_matching(&known, token)?;
        for report in &mut outcome.reports {
            report.round += self.rounds;
        }
        self.rounds += outcome.reports.len();
        self.matches = ClassMatches::from(&outcome.matching);
        Ok(outcome.reports)
    }

    /// The unmatched dest classes most similar to `source`, best first, ties in name order.
    pub fn likely_matches(&self, source: &ClassEntry) -> Vec<(ClassEntry, f64)> {
        let namer = ClassNamer::new(&self.matches.unique_matches());
        let identity = self
            .matcher
            .source_identifier(&namer, MatchPhase::References)
            .identify(source);
        let dest_ids = self.matcher.dest_identifier(&namer, MatchPhase::References);
        let normalization = self.matcher.config().score_normalization;

        let mut scored: Vec<(ClassEntry, f64)> = self
            .matches
            .unmatched_dest_classes()
            .into_iter()
            .map(|dest| {
                let score = identity.score(&dest_ids.identify(&dest), normalization);
                (dest, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(self.matcher.config().likely_match_limit);
        scored
    }
}
