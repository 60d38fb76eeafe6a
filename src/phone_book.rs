//! A name to phone number directory on top of `UnorderedMap`.

use crate::unordered_map::UnorderedMap;

#[derive(Clone, Debug, Default)]
pub struct PhoneBook {
    numbers: UnorderedMap<String, String>,
}

impl PhoneBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `number` for `name`. A name has one number; adding it again
    /// replaces the old number, which is returned.
    pub fn add_entry(&mut self, name: impl Into<String>, number: impl Into<String>) -> Option<String> {
        self.numbers.put(name.into(), number.into())
    }

    pub fn find_phone_number(&self, name: &str) -> Option<&str> {
        self.numbers.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.numbers.remove(name)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// `(name, number)` pairs sorted by name.
    pub fn listing(&self) -> Vec<(&str, &str)> {
        let mut all: Vec<(&str, &str)> = self
            .numbers
            .entries()
            .map(|(n, p)| (n.as_str(), p.as_str()))
            .collect();
        all.sort_unstable();
        all
    }
}
