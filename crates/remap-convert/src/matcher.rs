use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use remap_config::MatcherConfig;
use remap_core::ClassEntry;
use remap_index::PackageIndex;
use remap_scheduler::{BlockingTask, CancellationToken, Cancelled, Scheduler};
use serde::{Deserialize, Serialize};

use crate::identity::{ClassIdentifier, ClassIdentity, MatchPhase};
use crate::matching::ClassMatching;
use crate::namer::{ClassNamer, Side};

/// Counts after one matching round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub round: usize,
    pub phase: MatchPhase,
    pub new_unique_matches: usize,
    pub unique_matches: usize,
    pub ambiguous_matches: usize,
    pub unmatched_sources: usize,
    pub unmatched_dests: usize,
}

impl MatchReport {
    pub(crate) fn new(
        round: usize,
        phase: MatchPhase,
        unique_before: usize,
        matching: &ClassMatching,
    ) -> Self {
        let unique_matches = matching.unique_matches().len();
        let report = Self {
            round,
            phase,
            new_unique_matches: unique_matches.saturating_sub(unique_before),
            unique_matches,
            ambiguous_matches: matching.ambiguous_matches().len(),
            unmatched_sources: matching.unmatched_source_classes().len(),
            unmatched_dests: matching.unmatched_dest_classes().len(),
        };
        tracing::info!(
            target = "remap.convert",
            round,
            phase = %phase,
            new = report.new_unique_matches,
            unique = report.unique_matches,
            ambiguous = report.ambiguous_matches,
            unmatched_sources = report.unmatched_sources,
            unmatched_dests = report.unmatched_dests,
            "matching round finished"
        );
        report
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub matching: ClassMatching,
    pub reports: Vec<MatchReport>,
}

/// Matches the classes of two versions of a package.
#[derive(Debug, Clone, Copy)]
pub struct ClassMatcher<'a> {
    source: &'a PackageIndex,
    dest: &'a PackageIndex,
    config: &'a MatcherConfig,
}

impl<'a> ClassMatcher<'a> {
    pub fn new(source: &'a PackageIndex, dest: &'a PackageIndex, config: &'a MatcherConfig) -> Self {
        Self {
            source,
            dest,
            config,
        }
    }

    pub fn source(&self) -> &'a PackageIndex {
        self.source
    }

    pub fn dest(&self) -> &'a PackageIndex {
        self.dest
    }

    pub fn config(&self) -> &'a MatcherConfig {
        self.config
    }

    pub fn source_identifier<'n>(&self, namer: &'n ClassNamer, phase: MatchPhase) -> ClassIdentifier<'n>
    where
        'a: 'n,
    {
        ClassIdentifier::new(self.source, namer, Side::Source, phase)
    }

    pub fn dest_identifier<'n>(&self, namer: &'n ClassNamer, phase: MatchPhase) -> ClassIdentifier<'n>
    where
        'a: 'n,
    {
        ClassIdentifier::new(self.dest, namer, Side::Dest, phase)
    }

    /// One round: `anchors` are kept as they are and every pool is searched on its own, with
    /// class names inside identities substituted through `anchors`.
    pub fn round(
        &self,
        phase: MatchPhase,
        anchors: &BTreeMap<ClassEntry, ClassEntry>,
        pools: &[(Vec<ClassEntry>, Vec<ClassEntry>)],
    ) -> ClassMatching {
        let namer = ClassNamer::new(anchors);
        let source_ids = self.source_identifier(&namer, phase);
        let dest_ids = self.dest_identifier(&namer, phase);
        let anchored_dests: BTreeSet<&ClassEntry> = anchors.values().collect();

        let mut matching = ClassMatching::new();
        matching.add_known_matches(anchors);
        for (sources, dests) in pools {
            let sources: Vec<ClassIdentity> = sources
                .iter()
                .filter(|class| !anchors.contains_key(*class))
                .map(|class| source_ids.identify(class))
                .collect();
            let dests: Vec<ClassIdentity> = dests
                .iter()
                .filter(|class| !anchored_dests.contains(*class))
                .map(|class| dest_ids.identify(class))
                .collect();
            matching.match_pool(&sources, &dests, self.config);
        }
        matching
    }

    /// Runs rounds until no round adds a unique match, first on structure alone and then with
    /// references. Each round only searches what the previous one left unresolved.
    ///
    /// `known` pairs are kept fixed throughout. A round that adds no unique match is discarded
    /// whole, sharper ambiguity groups included; only the first round is always kept. Its report
    /// stays in [`MatchOutcome::reports`].
    pub fn compute_matching(
        &self,
        known: &BTreeMap<ClassEntry, ClassEntry>,
        token: &CancellationToken,
    ) -> Result<MatchOutcome, Cancelled> {
        let mut reports = Vec::new();
        let mut last: Option<ClassMatching> = None;
        let mut round = 0;

        for phase in [MatchPhase::Structure, MatchPhase::References] {
            let mut unique_before = last
                .as_ref()
                .map_or(known.len(), |matching| matching.unique_matches().len());
            loop {
                Cancelled::check(token)?;
                round += 1;

                let matching = match &last {
                    None => self.round(
                        phase,
                        known,
                        &[(
                            self.source.obf_class_entries().cloned().collect(),
                            self.dest.obf_class_entries().cloned().collect(),
                        )],
                    ),
                    Some(last) => self.round(phase, last.unique_matches(), &last.pools()),
                };
                reports.push(MatchReport::new(round, phase, unique_before, &matching));

                let unique = matching.unique_matches().len();
                let improved = unique > unique_before;
                if improved || last.is_none() {
                    last = Some(matching);
                }
                if !improved {
                    break;
                }
                unique_before = unique;
            }
        }

        Ok(MatchOutcome {
            matching: last.unwrap_or_default(),
            reports,
        })
    }
}

/// Computes a matching on the compute pool. Cancellation is observed between rounds.
pub fn spawn_matching(
    scheduler: &Scheduler,
    source: Arc<PackageIndex>,
    dest: Arc<PackageIndex>,
    known: BTreeMap<ClassEntry, ClassEntry>,
    config: MatcherConfig,
) -> BlockingTask<MatchOutcome> {
    scheduler.spawn_compute(move |token| {
        ClassMatcher::new(&source, &dest, &config).compute_matching(&known, &token)
    })
}
