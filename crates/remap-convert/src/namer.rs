use std::collections::BTreeMap;

use remap_core::ClassEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Dest,
}

/// Gives both classes of every confirmed match one shared placeholder name, so identities built
/// on either side spell a matched class the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNamer {
    source: BTreeMap<ClassEntry, String>,
    dest: BTreeMap<ClassEntry, String>,
}

impl ClassNamer {
    /// Names are handed out in source-name order.
    pub fn new(matches: &BTreeMap<ClassEntry, ClassEntry>) -> Self {
        let mut namer = Self::default();
        for (i, (source, dest)) in matches.iter().enumerate() {
            let name = format!("M{i:05}");
            namer.source.insert(source.clone(), name.clone());
            namer.dest.insert(dest.clone(), name);
        }
        namer
    }

    pub fn name(&self, side: Side, class: &ClassEntry) -> Option<&str> {
        let names = match side {
            Side::Source => &self.source,
            Side::Dest => &self.dest,
        };
        names.get(class).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}
