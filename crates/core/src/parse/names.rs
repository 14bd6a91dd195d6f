use std::collections::HashMap;

/// Per-category identifier compression table.
///
/// The Callgrind format avoids repeating long names by assigning small
/// integer ids: `fn=(7) alpha` defines id 7, and a later `fn=(7)` refers back
/// to it. Each symbol category (functions, objects) has its own independent
/// numbering, so a session holds one `NameTable` per category and tables are
/// never shared across files.
#[derive(Debug, Default)]
pub struct NameTable {
    entries: HashMap<u64, String>,
}

impl NameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `id` with `name`, overwriting any prior mapping for that id.
    pub fn define(&mut self, id: u64, name: impl Into<String>) {
        self.entries.insert(id, name.into());
    }

    /// Look up a previously defined id. `None` is the unresolved-reference
    /// condition.
    pub fn lookup(&self, id: u64) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Number of defined ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no ids have been defined yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut t = NameTable::new();
        t.define(1, "main");
        assert_eq!(t.lookup(1), Some("main"));
        assert_eq!(t.lookup(2), None);
    }

    #[test]
    fn redefine_overwrites() {
        let mut t = NameTable::new();
        t.define(2, "lib.so");
        t.define(2, "lib.so");
        assert_eq!(t.len(), 1);
        assert_eq!(t.lookup(2), Some("lib.so"));

        t.define(2, "other.so");
        assert_eq!(t.len(), 1);
        assert_eq!(t.lookup(2), Some("other.so"));
    }

    #[test]
    fn tables_start_empty() {
        let t = NameTable::new();
        assert!(t.is_empty());
    }
}
