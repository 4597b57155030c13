use remap_core::{BehaviorEntry, ClassEntry, FieldEntry};
use remap_index::PackageIndex;

use crate::mappings::Mappings;

/// Removes mappings whose obfuscated symbol is missing from a package, typically after the
/// package was replaced by a newer build.
#[derive(Debug)]
pub struct MappingsChecker<'a> {
    index: &'a PackageIndex,
    dropped_classes: Vec<ClassEntry>,
    dropped_fields: Vec<FieldEntry>,
    dropped_behaviors: Vec<BehaviorEntry>,
}

impl<'a> MappingsChecker<'a> {
    pub fn new(index: &'a PackageIndex) -> Self {
        Self {
            index,
            dropped_classes: Vec::new(),
            dropped_fields: Vec::new(),
            dropped_behaviors: Vec::new(),
        }
    }

    pub fn dropped_classes(&self) -> &[ClassEntry] {
        &self.dropped_classes
    }

    pub fn dropped_fields(&self) -> &[FieldEntry] {
        &self.dropped_fields
    }

    pub fn dropped_behaviors(&self) -> &[BehaviorEntry] {
        &self.dropped_behaviors
    }

    pub fn dropped_anything(&self) -> bool {
        !(self.dropped_classes.is_empty()
            && self.dropped_fields.is_empty()
            && self.dropped_behaviors.is_empty())
    }

    pub fn drop_broken_mappings(&mut self, mappings: &mut Mappings) {
        // Outer classes come first, so a dropped outer class takes its inner classes along.
        let classes: Vec<ClassEntry> = mappings
            .all_classes()
            .into_iter()
            .map(|mapping| mapping.obf_entry())
            .collect();

        for class in classes {
            let Some(mapping) = mappings.class_by_obf(class.name()) else {
                continue;
            };
            if !self.index.contains_obf_class(&class) {
                mappings.remove_class_mapping(&class);
                self.dropped_classes.push(class);
                continue;
            }

            let broken_fields: Vec<FieldEntry> = mapping
                .fields()
                .map(|field| field.obf_entry(&class))
                .filter(|field| !self.index.contains_obf_field(field))
                .collect();
            let broken_behaviors: Vec<BehaviorEntry> = mapping
                .methods()
                .map(|method| method.obf_entry(&class))
                .filter(|behavior| !self.index.contains_obf_behavior(behavior))
                .collect();

            if broken_fields.is_empty() && broken_behaviors.is_empty() {
                continue;
            }
            if let Some(mapping) = mappings.class_by_obf_mut(class.name()) {
                for field in &broken_fields {
                    mapping.remove_field_mapping(&field.name, &field.ty);
                }
                for behavior in &broken_behaviors {
                    if let Some(signature) = behavior.signature() {
                        mapping.remove_method_mapping(behavior.name(), signature);
                    }
                }
            }
            mappings.prune(&class);

            self.dropped_fields.extend(broken_fields);
            self.dropped_behaviors.extend(broken_behaviors);
        }

        if self.dropped_anything() {
            tracing::info!(
                target = "remap.mappings",
                classes = self.dropped_classes.len(),
                fields = self.dropped_fields.len(),
                behaviors = self.dropped_behaviors.len(),
                "dropped broken mappings"
            );
        }
    }
}
