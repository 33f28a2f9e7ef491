use std::collections::HashMap;

/// Names visible inside the function body currently being lowered.
///
/// There is exactly one scope: it is reset when lowering of a function
/// starts and emptied again once that lowering finishes.
pub struct SymbolTable<T> {
    values: HashMap<String, T>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SymbolTable<T> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn insert(&mut self, name: String, value: T) -> Result<(), String> {
        if self.values.contains_key(&name) {
            return Err(name);
        }
        self.values.insert(name, value);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<T>
    where
        T: Clone,
    {
        self.values.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
