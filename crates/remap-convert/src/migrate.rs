use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use remap_core::ClassEntry;
use remap_mappings::Mappings;

use crate::error::ConvertError;

/// Rebuilds `old` on the classes of a newer package build.
///
/// `matches` pairs old obfuscated classes with new ones. Each matched class mapping moves to its
/// new class with its members still under their old obfuscated names; classes named in member
/// types and signatures are rewritten through `matches`. Mappings of unmatched classes are left
/// behind, and an inner class keeps only its simple deobfuscated name.
pub fn migrate_mappings(
    old: &Mappings,
    matches: &BTreeMap<ClassEntry, ClassEntry>,
) -> Result<Mappings, ConvertError> {
    let forward: BTreeMap<String, String> = matches
        .iter()
        .map(|(source, dest)| (source.name().to_owned(), dest.name().to_owned()))
        .collect();
    let mut replace = |name: &str| forward.get(name).cloned();

    // Outer classes before their inner classes.
    let mut ordered: Vec<(&ClassEntry, &ClassEntry)> = matches.iter().collect();
    ordered.sort_by(|(_, a), (_, b)| (a.chain_depth(), *a).cmp(&(b.chain_depth(), *b)));

    let mut migrated = Mappings::new();
    let mut moved = 0usize;
    for (source, dest) in ordered {
        let Some(mapping) = old.class_by_obf(source.name()) else {
            continue;
        };
        let mapping = mapping.migrated_to(dest, &mut replace);
        if mapping.is_empty() {
            continue;
        }
        migrated.insert_class_mapping(mapping)?;
        moved += 1;
    }

    tracing::info!(
        target = "remap.convert",
        matched = matches.len(),
        moved,
        "migrated class mappings"
    );
    Ok(migrated)
}

/// Renames obfuscated classes in place, rewriting every type and signature that mentions them.
///
/// Outer classes are renamed before their inner classes, which travel with them; an inner rename
/// the outer one already implies is skipped. Within one nesting depth, renames run in an order
/// where no class takes a name another class still holds. The renames are applied to a copy, so a
/// cycle, a target held by a class that is not itself renamed, or any other failure leaves
/// `mappings` unchanged.
pub fn convert_mappings(
    mappings: &mut Mappings,
    changes: &BTreeMap<ClassEntry, ClassEntry>,
) -> Result<(), ConvertError> {
    let mut stages: BTreeMap<usize, Vec<(&ClassEntry, &ClassEntry)>> = BTreeMap::new();
    for (from, to) in changes {
        stages.entry(from.chain_depth()).or_default().push((from, to));
    }

    let mut converted = mappings.clone();
    let mut applied: Vec<(ClassEntry, ClassEntry)> = Vec::new();
    for stage in stages.into_values() {
        let renames: BTreeMap<ClassEntry, ClassEntry> = stage
            .into_iter()
            .map(|(from, to)| {
                let current = applied
                    .iter()
                    .fold(from.clone(), |class, (old, new)| follow(&class, old, new));
                (current, to.clone())
            })
            .filter(|(current, to)| current != to)
            .collect();

        for (from, to) in &renames {
            if converted.class_by_obf(to.name()).is_some() && !renames.contains_key(to) {
                return Err(ConvertError::TargetOccupied {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        for (from, to) in order_renames(&renames)? {
            converted.rename_obf_class(&from, &to)?;
            applied.push((from, to));
        }
    }

    *mappings = converted;
    tracing::info!(
        target = "remap.convert",
        requested = changes.len(),
        renamed = applied.len(),
        "converted class mappings"
    );
    Ok(())
}

/// Where `class` ends up once `from` is renamed to `to`.
fn follow(class: &ClassEntry, from: &ClassEntry, to: &ClassEntry) -> ClassEntry {
    if class == from {
        return to.clone();
    }
    match class.name().strip_prefix(from.name()) {
        Some(rest) if rest.starts_with('$') => ClassEntry::new(format!("{}{rest}", to.name())),
        _ => class.clone(),
    }
}

/// Orders `renames` so each key is renamed only after the previous holder of its target has
/// moved on. Identity renames are dropped.
pub(crate) fn order_renames<K>(renames: &BTreeMap<K, K>) -> Result<Vec<(K, K)>, ConvertError>
where
    K: Ord + Clone + fmt::Display,
{
    let mut pending: BTreeMap<K, K> = renames
        .iter()
        .filter(|(from, to)| from != to)
        .map(|(from, to)| (from.clone(), to.clone()))
        .collect();

    let mut targets = BTreeSet::new();
    for (from, to) in &pending {
        if !targets.insert(to) {
            return Err(ConvertError::TargetOccupied {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }

    let mut ordered = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let ready: Vec<K> = pending
            .iter()
            .filter(|(_, to)| !pending.contains_key(*to))
            .map(|(from, _)| from.clone())
            .collect();
        if ready.is_empty() {
            return Err(ConvertError::RenameCycle {
                names: pending.keys().map(ToString::to_string).collect(),
            });
        }
        for from in ready {
            if let Some(to) = pending.remove(&from) {
                ordered.push((from, to));
            }
        }
    }
    Ok(ordered)
}
