//! Sample domain types used as keys and values by the demos.
//!
//! `Student` is the custom key: its `Hash` and `Eq` are written by hand and
//! both look at `id` and `name`, so two students with identical fields are
//! the same key in an `UnorderedMap`. Its `Ord` (id, then name) is the
//! intrinsic order; `StudentNameOrder` and `StudentIdOrder` are external
//! orders for the same type.

use crate::equivalence::Comparator;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

#[derive(Clone, Debug)]
pub struct Student {
    id: u32,
    name: String,
}

impl Student {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// Hash and Eq must agree: both cover exactly `id` and `name`.
impl Hash for Student {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.name.hash(state);
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Eq for Student {}

impl Ord for Student {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Student {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Student{{id={}, name={}}}", self.id, self.name)
    }
}

/// Orders students alphabetically by name. Students sharing a name are the
/// same key under this order.
#[derive(Clone, Copy, Debug, Default)]
pub struct StudentNameOrder;

impl Comparator<Student> for StudentNameOrder {
    fn compare(&self, a: &Student, b: &Student) -> Ordering {
        a.name.cmp(&b.name)
    }
}

/// Orders students by id only. Students sharing an id are the same key
/// under this order.
#[derive(Clone, Copy, Debug, Default)]
pub struct StudentIdOrder;

impl Comparator<Student> for StudentIdOrder {
    fn compare(&self, a: &Student, b: &Student) -> Ordering {
        a.id.cmp(&b.id)
    }
}

/// A value type with no hash or order of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    code: u32,
    title: String,
}

impl Book {
    pub fn new(code: u32, title: impl Into<String>) -> Self {
        Self {
            code,
            title: title.into(),
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Book{{code={}, title={}}}", self.code, self.title)
    }
}
