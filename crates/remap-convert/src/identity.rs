use std::collections::BTreeMap;
use std::fmt;

use remap_config::ScoreNormalization;
use remap_core::{BehaviorEntry, ClassEntry};
use remap_index::PackageIndex;
use serde::{Deserialize, Serialize};

use crate::namer::{ClassNamer, Side};

const SELF_NAME: &str = "@self";
const UNKNOWN_NAME: &str = "?";

type Multiset = BTreeMap<String, usize>;

fn overlap(a: &Multiset, b: &Multiset) -> usize {
    a.iter()
        .map(|(key, n)| b.get(key).map_or(0, |m| (*n).min(*m)))
        .sum()
}

fn size(set: &Multiset) -> usize {
    set.values().sum()
}

fn insert(set: &mut Multiset, key: String) {
    *set.entry(key).or_insert(0) += 1;
}

/// Which features a matching round may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Supertypes and member types only.
    Structure,
    /// Also the classes that member bodies mention.
    References,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPhase::Structure => f.write_str("structure"),
            MatchPhase::References => f.write_str("references"),
        }
    }
}

/// Structural fingerprint of one class.
///
/// Class names inside the fingerprint are scrubbed: the class itself becomes `@self`, a class of
/// the same package becomes its shared match name when it has one and `?` otherwise, and classes
/// outside the package keep their names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIdentity {
    class: ClassEntry,
    outer: Option<String>,
    superclass: Option<String>,
    interfaces: Multiset,
    fields: Multiset,
    methods: Multiset,
    constructors: Multiset,
    static_initializer: bool,
    references: Multiset,
}

impl ClassIdentity {
    fn empty(class: ClassEntry) -> Self {
        Self {
            class,
            outer: None,
            superclass: None,
            interfaces: Multiset::new(),
            fields: Multiset::new(),
            methods: Multiset::new(),
            constructors: Multiset::new(),
            static_initializer: false,
            references: Multiset::new(),
        }
    }

    pub fn class(&self) -> &ClassEntry {
        &self.class
    }

    /// How many of this identity's features `other` shares.
    pub fn match_score(&self, other: &ClassIdentity) -> usize {
        let same = |a: &Option<String>, b: &Option<String>| usize::from(a.is_some() && a == b);
        same(&self.outer, &other.outer)
            + same(&self.superclass, &other.superclass)
            + overlap(&self.interfaces, &other.interfaces)
            + overlap(&self.fields, &other.fields)
            + overlap(&self.methods, &other.methods)
            + overlap(&self.constructors, &other.constructors)
            + usize::from(self.static_initializer && other.static_initializer)
            + overlap(&self.references, &other.references)
    }

    /// The score of a perfect match against this identity.
    pub fn max_match_score(&self) -> usize {
        usize::from(self.outer.is_some())
            + usize::from(self.superclass.is_some())
            + size(&self.interfaces)
            + size(&self.fields)
            + size(&self.methods)
            + size(&self.constructors)
            + usize::from(self.static_initializer)
            + size(&self.references)
    }

    /// Pair score combining both directions.
    pub fn score(&self, other: &ClassIdentity, normalization: ScoreNormalization) -> f64 {
        let combined = self.match_score(other) + other.match_score(self);
        match normalization {
            ScoreNormalization::CombinedMaximum => {
                let max = self.max_match_score() + other.max_match_score();
                if max == 0 {
                    0.0
                } else {
                    combined as f64 / max as f64
                }
            }
            ScoreNormalization::None => combined as f64,
        }
    }
}

/// Builds identities for the classes of one package version.
#[derive(Debug, Clone, Copy)]
pub struct ClassIdentifier<'a> {
    index: &'a PackageIndex,
    namer: &'a ClassNamer,
    side: Side,
    phase: MatchPhase,
}

impl<'a> ClassIdentifier<'a> {
    pub fn new(index: &'a PackageIndex, namer: &'a ClassNamer, side: Side, phase: MatchPhase) -> Self {
        Self {
            index,
            namer,
            side,
            phase,
        }
    }

    fn scrub(&self, class: &ClassEntry, name: &str) -> String {
        if name == class.name() {
            return SELF_NAME.to_owned();
        }
        let entry = ClassEntry::new(name);
        if let Some(shared) = self.namer.name(self.side, &entry) {
            shared.to_owned()
        } else if self.index.contains_obf_class(&entry) {
            UNKNOWN_NAME.to_owned()
        } else {
            name.to_owned()
        }
    }

    pub fn identify(&self, class: &ClassEntry) -> ClassIdentity {
        let mut identity = ClassIdentity::empty(class.clone());
        let Some(record) = self.index.class_record(class) else {
            return identity;
        };
        let mut scrub = |name: &str| Some(self.scrub(class, name));

        identity.outer = class
            .enclosing_class()
            .map(|outer| self.scrub(class, outer.name()));
        identity.superclass = record
            .superclass
            .as_ref()
            .map(|superclass| self.scrub(class, superclass.name()));
        for interface in &record.interfaces {
            insert(&mut identity.interfaces, self.scrub(class, interface.name()));
        }
        for field in &record.fields {
            insert(
                &mut identity.fields,
                field.ty.replace_classes(&mut scrub).to_string(),
            );
        }
        for behavior in &record.behaviors {
            match behavior {
                BehaviorEntry::Method(method) => insert(
                    &mut identity.methods,
                    method.signature.replace_classes(&mut scrub).to_string(),
                ),
                BehaviorEntry::Constructor(ctor) => match &ctor.signature {
                    Some(signature) => insert(
                        &mut identity.constructors,
                        signature.replace_classes(&mut scrub).to_string(),
                    ),
                    None => identity.static_initializer = true,
                },
            }
        }
        if self.phase == MatchPhase::References {
            for reference in &record.references {
                insert(&mut identity.references, self.scrub(class, reference.name()));
            }
        }
        identity
    }
}
