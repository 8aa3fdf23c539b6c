use std::collections::HashMap;

use serde::Serialize;

/// An interned identifier. Equal spellings intern to equal handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Name(u32);

#[derive(Debug, Clone, Default, Serialize)]
pub struct NameTable {
    #[serde(skip)]
    ids: HashMap<String, Name>,
    names: Vec<String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, spelling: &str) -> Name {
        if let Some(&name) = self.ids.get(spelling) {
            return name;
        }
        let name = Name(self.names.len() as u32);
        self.names.push(spelling.to_owned());
        self.ids.insert(spelling.to_owned(), name);
        name
    }

    /// Looks up a spelling without interning it.
    pub fn get(&self, spelling: &str) -> Option<Name> {
        self.ids.get(spelling).copied()
    }

    pub fn resolve(&self, name: Name) -> &str {
        self.names.get(name.0 as usize).map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_identity() {
        let mut table = NameTable::new();
        let a = table.intern("global");
        let b = table.intern("Foo");
        assert_eq!(table.intern("global"), a);
        assert_ne!(a, b);
        assert_eq!(table.resolve(b), "Foo");
        assert_eq!(table.get("Foo"), Some(b));
        assert_eq!(table.get("Bar"), None);
        assert_eq!(table.len(), 2);
    }
}
