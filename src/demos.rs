//! Demonstration programs for the maps.
//!
//! Each demo builds a map from literal sample data, queries it and writes
//! pre-formatted lines to the given sink. Demos are selected by name from a
//! static table; they only use the public map API.
//!
//! Output from unordered maps follows the map's iteration order, which is
//! unspecified and varies between runs.

use crate::error::{MapError, Result};
use crate::map_trait::KeyValueMap;
use crate::ordered_map::OrderedMap;
use crate::phone_book::PhoneBook;
use crate::sample::{Book, Student, StudentIdOrder, StudentNameOrder};
use crate::unordered_map::UnorderedMap;
use std::io::Write;

pub type DemoFn = fn(&mut dyn Write) -> Result<()>;

pub struct Demo {
    pub name: &'static str,
    pub summary: &'static str,
    run: DemoFn,
}

impl Demo {
    pub fn run(&self, out: &mut dyn Write) -> Result<()> {
        log::debug!("running demo `{}`", self.name);
        (self.run)(out)
    }
}

impl core::fmt::Debug for Demo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Demo").field("name", &self.name).finish()
    }
}

pub static DEMOS: &[Demo] = &[
    Demo {
        name: "films",
        summary: "unordered map: name -> favourite film",
        run: films,
    },
    Demo {
        name: "ages",
        summary: "unordered map: name -> age, repeated key",
        run: ages,
    },
    Demo {
        name: "books",
        summary: "unordered map: book code -> book",
        run: books,
    },
    Demo {
        name: "friends",
        summary: "unordered map: name -> list of friends",
        run: friends,
    },
    Demo {
        name: "short-titles",
        summary: "passing a map as an argument",
        run: short_titles,
    },
    Demo {
        name: "sorted-books",
        summary: "ordered map: book code -> book",
        run: sorted_books,
    },
    Demo {
        name: "student-books",
        summary: "unordered map with a custom key: student -> book",
        run: student_books,
    },
    Demo {
        name: "user-attributes",
        summary: "unordered map of maps: name -> attributes",
        run: user_attributes,
    },
    Demo {
        name: "students-by-name",
        summary: "ordered map with a name comparator: student -> book",
        run: students_by_name,
    },
    Demo {
        name: "students-by-id",
        summary: "ordered map built at runtime with an id comparator",
        run: students_by_id,
    },
    Demo {
        name: "phone-book",
        summary: "phone book container over an unordered map",
        run: phone_book,
    },
];

/// Look a demo up by name.
pub fn find(name: &str) -> Result<&'static Demo> {
    DEMOS
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| MapError::UnknownDemo(name.to_string()))
}

/// Books whose title has at most `max_len` characters, in the map's
/// iteration order.
pub fn short_titled_books(map: &dyn KeyValueMap<u32, Book>, max_len: usize) -> Vec<&Book> {
    map.values()
        .filter(|b| b.title().chars().count() <= max_len)
        .collect()
}

fn films(out: &mut dyn Write) -> Result<()> {
    let mut films = UnorderedMap::new();
    films.put("John", "Alien");
    films.put("Anne", "LaLa Land");
    films.put("Zoe", "Alien");
    // Keys are unique: this replaces "Alien".
    films.put("Zoe", "Trainspotting");

    let key = "Zoe";
    if let Some(film) = films.get(&key) {
        writeln!(out, "{key}'s favourite film is: {film}")?;
    }

    films.remove(&"John");

    let key = "Elvis";
    match films.get(&key) {
        Some(film) => writeln!(out, "{key}'s favourite film is: {film}")?,
        None => writeln!(out, "{key} NOT found in map")?,
    }
    if films.contains_key(&key) {
        writeln!(out, "The key {key} is contained in the map.")?;
    } else {
        writeln!(out, "The key {key} is NOT contained in the map.")?;
    }

    writeln!(out, "All entries:")?;
    for (name, film) in films.entries() {
        writeln!(out, "{name} -> {film}")?;
    }
    writeln!(out, "All values:")?;
    for film in films.values() {
        writeln!(out, "{film}")?;
    }
    writeln!(out, "All keys:")?;
    for name in films.keys() {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

fn ages(out: &mut dyn Write) -> Result<()> {
    let mut ages = UnorderedMap::new();
    ages.put("John", 18u32);
    ages.put("Anne", 19);
    ages.put("Adam", 17);
    ages.put("Adam", 99);

    for (name, age) in ages.entries() {
        writeln!(out, "{name} : {age}")?;
    }

    let key = "Anne";
    match ages.get(&key) {
        Some(age) => writeln!(out, "ages contains the key: {key} with age: {age}")?,
        None => writeln!(out, "ages does NOT contain the key: {key}")?,
    }
    Ok(())
}

fn books(out: &mut dyn Write) -> Result<()> {
    let mut books = UnorderedMap::new();
    for book in [
        Book::new(30004, "Fight Club"),
        Book::new(40023, "Jaws"),
        Book::new(55523, "White Teeth"),
        Book::new(66623, "Ted Bundy"),
    ] {
        books.put(book.code(), book);
    }

    writeln!(out, "Code -> Book object")?;
    for (code, book) in books.entries() {
        writeln!(out, "{code} -> {book}")?;
    }
    Ok(())
}

fn friends(out: &mut dyn Write) -> Result<()> {
    let mut friends: UnorderedMap<&str, Vec<&str>> = UnorderedMap::new();
    // Each key gets its own freshly created list.
    for (name, friend) in [
        ("John", "Kylie"),
        ("John", "Donald"),
        ("Julie", "Barak"),
        ("Julie", "James"),
        ("Julie", "Megan"),
    ] {
        friends.get_or_insert_with(name, Vec::new).push(friend);
    }

    let key = "John";
    if let Some(list) = friends.get(&key) {
        writeln!(out, "{key}'s friends: [{}]", list.join(", "))?;
    }

    writeln!(out, "NAME -> LIST OF FRIENDS")?;
    for (name, list) in friends.entries() {
        writeln!(out, "{name} -> [{}]", list.join(", "))?;
    }
    Ok(())
}

fn short_titles(out: &mut dyn Write) -> Result<()> {
    let mut books: Box<dyn KeyValueMap<u32, Book>> = Box::new(UnorderedMap::new());
    books.put(30004, Book::new(30004, "Fight Club"));
    books.put(40023, Book::new(40023, "Jaws"));
    books.put(55523, Book::new(55523, "White Teeth"));
    // Same key: replaces "White Teeth".
    books.put(55523, Book::new(55523, "Ted"));

    let mut short = short_titled_books(&*books, 4);
    short.sort_by_key(|b| b.code());

    writeln!(out, "Books with short titles (<= 4 characters)")?;
    for book in short {
        writeln!(out, " Code: {}, Title: {}", book.code(), book.title())?;
    }
    Ok(())
}

fn sorted_books(out: &mut dyn Write) -> Result<()> {
    let mut books = OrderedMap::new();
    for book in [
        Book::new(55523, "White Teeth"),
        Book::new(30004, "Fight Club"),
        Book::new(66623, "Ted"),
        Book::new(40023, "Jaws"),
    ] {
        books.put(book.code(), book);
    }

    writeln!(out, "Ordered map: output is in key order")?;
    for (code, book) in books.entries() {
        writeln!(out, "Key: {code}, Title: {}, Code: {}", book.title(), book.code())?;
    }
    Ok(())
}

fn student_books(out: &mut dyn Write) -> Result<()> {
    let mut favourite = UnorderedMap::new();
    favourite.put(Student::new(1001, "Tom Malone"), Book::new(30004, "Lazy Days"));
    favourite.put(Student::new(2002, "Zoe Salanda"), Book::new(40023, "Columbiana"));
    // A distinct instance with identical fields is the same key.
    favourite.put(Student::new(2002, "Zoe Salanda"), Book::new(40024, "Salt"));

    writeln!(out, "Map: [ Student -> Book ] ({} entries)", favourite.len())?;
    for (student, book) in favourite.entries() {
        writeln!(out, "Student: {student}, favourite Book: {book}")?;
    }
    Ok(())
}

fn user_attributes(out: &mut dyn Write) -> Result<()> {
    let mut users = UnorderedMap::new();

    // One fresh inner map per user; never share an inner map between keys.
    let mut attributes = UnorderedMap::new();
    attributes.put("Hair", "Red");
    attributes.put("Height", "1.76");
    users.put("John", attributes);

    let mut attributes = UnorderedMap::new();
    attributes.put("Hair", "Black");
    attributes.put("Height", "1.76");
    attributes.put("Age", "21");
    users.put("Alice", attributes);

    writeln!(out, "Map: [ String (name) => Map (attributes) ]")?;
    for (user, attributes) in users.entries() {
        writeln!(out, "User Name: {user}")?;
        for (attribute, value) in attributes.entries() {
            writeln!(out, " Attribute name: {attribute} Value: {value}")?;
        }
    }
    Ok(())
}

fn students_by_name(out: &mut dyn Write) -> Result<()> {
    let mut favourite = OrderedMap::with_comparator(StudentNameOrder);
    favourite.put(Student::new(1001, "Tom Malone"), Book::new(30004, "Lazy Days"));
    favourite.put(Student::new(2002, "Zoe Salanda"), Book::new(40023, "Columbiana"));
    favourite.put(Student::new(2002, "Adam Ant"), Book::new(30053, "Mountains"));

    writeln!(out, "Map: [ Student -> Book ] ordered by name")?;
    for (student, book) in favourite.entries() {
        writeln!(out, "Student: {student}, favourite Book: {book}")?;
    }
    Ok(())
}

fn students_by_id(out: &mut dyn Write) -> Result<()> {
    let mut favourite: OrderedMap<Student, Book, _> = OrderedMap::builder()
        .comparator(StudentIdOrder)
        .build()?;
    favourite.put(Student::new(1001, "Tom Malone"), Book::new(30004, "Lazy Days"));
    favourite.put(Student::new(2002, "Zoe Salanda"), Book::new(40023, "Columbiana"));
    // Same id as Zoe: under this order it is the same key, so only the book
    // changes and Zoe's key stays.
    favourite.put(Student::new(2002, "Adam Ant"), Book::new(30053, "Mountains"));

    writeln!(out, "Map: [ Student -> Book ] ordered by id ({} entries)", favourite.len())?;
    for (student, book) in favourite.entries() {
        writeln!(out, "Student: {student}, favourite Book: {book}")?;
    }
    Ok(())
}

fn phone_book(out: &mut dyn Write) -> Result<()> {
    let mut book = PhoneBook::new();
    book.add_entry("John", "087 111 2222");
    book.add_entry("Anne", "086 333 4444");
    book.add_entry("Zoe", "085 555 6666");
    book.add_entry("Adam", "083 777 8888");
    book.add_entry("Julie", "089 999 0000");

    for name in ["Zoe", "Elvis"] {
        match book.find_phone_number(name) {
            Some(number) => writeln!(out, "{name}: {number}")?,
            None => writeln!(out, "{name}: no number")?,
        }
    }

    book.remove("Zoe");
    writeln!(out, "After removing Zoe ({} entries):", book.len())?;
    for (name, number) in book.listing() {
        writeln!(out, "{name}: {number}")?;
    }
    Ok(())
}
