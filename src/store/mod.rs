//! In-memory directory of users, books, and categories.
//!
//! This is the storage collaborator behind proximity search: the engine only
//! ever sees a snapshot of candidates with coordinates, and the directory is
//! responsible for producing those snapshots. Ids are assigned sequentially,
//! user emails and category names are unique.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{Book, Category, User};
use crate::search::Located;

/// Errors raised when inserting into the directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("a user with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("a category named '{0}' already exists")]
    DuplicateCategory(String),
    #[error("no user with email '{0}'")]
    UnknownOwner(String),
}

/// Input for registering a user. Categories are given by name and created
/// on demand.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Input for adding a book. The owner is referenced by email so fixtures
/// never have to coordinate numeric ids.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub owner_email: String,
    pub name: String,
    pub author: String,
    pub description: String,
    pub publication_date: NaiveDate,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// A book-owning user with the books that matched a shelf query.
///
/// This is the one-to-many join surface: one row per owner, never one row
/// per book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shelf {
    pub user: User,
    pub books: Vec<Book>,
}

impl Located for Shelf {
    fn id(&self) -> i64 {
        self.user.id
    }

    fn latitude(&self) -> f64 {
        self.user.latitude
    }

    fn longitude(&self) -> f64 {
        self.user.longitude
    }
}

#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    users: Vec<NewUser>,
    #[serde(default)]
    books: Vec<NewBook>,
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    books: Vec<Book>,
    categories: Vec<Category>,
    next_user_id: i64,
    next_book_id: i64,
    next_category_id: i64,
}

impl Inner {
    fn ensure_category(&mut self, name: &str) -> i64 {
        if let Some(existing) = self.categories.iter().find(|c| c.name == name) {
            return existing.id;
        }
        self.next_category_id += 1;
        let id = self.next_category_id;
        self.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }
}

/// Shared, thread-safe directory. Handlers read snapshots; inserts take the
/// write lock briefly. No query holds a lock while searching.
#[derive(Debug, Default)]
pub struct Directory {
    inner: RwLock<Inner>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user. Fails on a duplicate email.
    pub fn add_user(&self, new: NewUser) -> Result<User, DirectoryError> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(DirectoryError::DuplicateEmail(new.email));
        }
        let category_ids = new
            .categories
            .iter()
            .map(|name| inner.ensure_category(name))
            .collect();
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            name: new.name,
            email: new.email,
            address: new.address,
            latitude: new.latitude,
            longitude: new.longitude,
            join_date: Utc::now(),
            category_ids,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    /// Add a book under an existing owner.
    pub fn add_book(&self, new: NewBook) -> Result<Book, DirectoryError> {
        let mut inner = self.inner.write().unwrap();
        let user_id = inner
            .users
            .iter()
            .find(|u| u.email == new.owner_email)
            .map(|u| u.id)
            .ok_or(DirectoryError::UnknownOwner(new.owner_email))?;
        let category_ids = new
            .categories
            .iter()
            .map(|name| inner.ensure_category(name))
            .collect();
        inner.next_book_id += 1;
        let book = Book {
            id: inner.next_book_id,
            user_id,
            name: new.name,
            author: new.author,
            description: new.description,
            publication_date: new.publication_date,
            category_ids,
        };
        inner.books.push(book.clone());
        Ok(book)
    }

    /// Create a category. Fails if the name is taken.
    pub fn add_category(&self, name: &str) -> Result<Category, DirectoryError> {
        let mut inner = self.inner.write().unwrap();
        if inner.categories.iter().any(|c| c.name == name) {
            return Err(DirectoryError::DuplicateCategory(name.to_string()));
        }
        let id = inner.ensure_category(name);
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    /// Look up a category id by exact name.
    pub fn category_id(&self, name: &str) -> Option<i64> {
        let inner = self.inner.read().unwrap();
        inner.categories.iter().find(|c| c.name == name).map(|c| c.id)
    }

    /// Categories, optionally narrowed to names containing `filter`.
    pub fn categories(&self, filter: Option<&str>) -> Vec<Category> {
        let inner = self.inner.read().unwrap();
        inner
            .categories
            .iter()
            .filter(|c| filter.map_or(true, |f| c.name.contains(f)))
            .cloned()
            .collect()
    }

    /// Snapshot of all users, the candidate set for user search.
    pub fn users(&self) -> Vec<User> {
        self.inner.read().unwrap().users.clone()
    }

    /// Book-owner candidates: every user owning at least one book, carrying
    /// the matching books. With a category, only books in that category
    /// count and owners with none matching drop out.
    pub fn shelves(&self, category: Option<i64>) -> Vec<Shelf> {
        let inner = self.inner.read().unwrap();

        let mut by_owner: HashMap<i64, Vec<Book>> = HashMap::new();
        for book in &inner.books {
            if category.map_or(true, |id| book.in_category(id)) {
                by_owner.entry(book.user_id).or_default().push(book.clone());
            }
        }

        // Users are stored in insertion order; keep shelves in the same
        // order so search tie-breaks stay deterministic.
        inner
            .users
            .iter()
            .filter_map(|user| {
                by_owner.remove(&user.id).map(|books| Shelf {
                    user: user.clone(),
                    books,
                })
            })
            .collect()
    }

    /// Shelves narrowed by category name. An unknown name matches no
    /// books, so it yields an empty candidate set rather than an error.
    pub fn shelves_named(&self, category: Option<&str>) -> Vec<Shelf> {
        match category {
            Some(name) => match self.category_id(name) {
                Some(id) => self.shelves(Some(id)),
                None => Vec::new(),
            },
            None => self.shelves(None),
        }
    }

    pub fn user_count(&self) -> usize {
        self.inner.read().unwrap().users.len()
    }

    pub fn book_count(&self) -> usize {
        self.inner.read().unwrap().books.len()
    }

    /// Load a JSON fixtures file: `{ categories, users, books }`, each
    /// section optional.
    pub fn load_fixtures<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read fixtures file {}", path.as_ref().display())
        })?;
        let fixtures: FixtureFile =
            serde_json::from_str(&content).context("Failed to parse fixtures file")?;

        for name in &fixtures.categories {
            self.inner.write().unwrap().ensure_category(name);
        }
        for user in fixtures.users {
            let email = user.email.clone();
            self.add_user(user)
                .with_context(|| format!("Failed to load fixture user '{}'", email))?;
        }
        for book in fixtures.books {
            let name = book.name.clone();
            self.add_book(book)
                .with_context(|| format!("Failed to load fixture book '{}'", name))?;
        }

        info!(
            "Loaded fixtures from {}: {} users, {} books, {} categories",
            path.as_ref().display(),
            self.user_count(),
            self.book_count(),
            self.categories(None).len()
        );
        Ok(())
    }

    /// Import predefined categories from a plain-text file, one name per
    /// line. Blank lines and repeats are ignored.
    pub fn import_categories<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read categories file {}", path.as_ref().display())
        })?;

        let mut imported = 0;
        let mut inner = self.inner.write().unwrap();
        for name in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let before = inner.categories.len();
            inner.ensure_category(name);
            if inner.categories.len() > before {
                imported += 1;
            }
        }
        info!(
            "Imported {} categories from {}",
            imported,
            path.as_ref().display()
        );
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn user(name: &str, email: &str, lat: f64, lon: f64) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            address: "1 Main St".to_string(),
            latitude: lat,
            longitude: lon,
            categories: vec![],
        }
    }

    fn book(owner_email: &str, name: &str, categories: &[&str]) -> NewBook {
        NewBook {
            owner_email: owner_email.to_string(),
            name: name.to_string(),
            author: "Anon".to_string(),
            description: "n/a".to_string(),
            publication_date: NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let dir = Directory::new();
        let a = dir.add_user(user("Ann", "ann@example.com", 32.85, 35.09)).unwrap();
        let b = dir.add_user(user("Ben", "ben@example.com", 32.84, 35.10)).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let dir = Directory::new();
        dir.add_user(user("Ann", "ann@example.com", 32.85, 35.09)).unwrap();
        let err = dir
            .add_user(user("Ann Again", "ann@example.com", 32.84, 35.10))
            .unwrap_err();
        assert_eq!(
            err,
            DirectoryError::DuplicateEmail("ann@example.com".to_string())
        );
        assert_eq!(dir.user_count(), 1);
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let dir = Directory::new();
        dir.add_category("fantasy").unwrap();
        assert_eq!(
            dir.add_category("fantasy").unwrap_err(),
            DirectoryError::DuplicateCategory("fantasy".to_string())
        );
    }

    #[test]
    fn test_book_requires_known_owner() {
        let dir = Directory::new();
        let err = dir.add_book(book("ghost@example.com", "Dune", &[])).unwrap_err();
        assert_eq!(
            err,
            DirectoryError::UnknownOwner("ghost@example.com".to_string())
        );
    }

    #[test]
    fn test_book_categories_created_on_demand() {
        let dir = Directory::new();
        dir.add_user(user("Ann", "ann@example.com", 32.85, 35.09)).unwrap();
        let b = dir.add_book(book("ann@example.com", "Dune", &["scifi"])).unwrap();
        let scifi = dir.category_id("scifi").unwrap();
        assert_eq!(b.category_ids, vec![scifi]);
    }

    #[test]
    fn test_categories_contains_filter() {
        let dir = Directory::new();
        for name in ["science fiction", "science", "history"] {
            dir.add_category(name).unwrap();
        }
        let hits = dir.categories(Some("science"));
        let names: Vec<&str> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["science fiction", "science"]);
        assert_eq!(dir.categories(None).len(), 3);
    }

    #[test]
    fn test_shelves_group_books_per_owner() {
        let dir = Directory::new();
        dir.add_user(user("Ann", "ann@example.com", 32.85, 35.09)).unwrap();
        dir.add_user(user("Ben", "ben@example.com", 32.84, 35.10)).unwrap();
        dir.add_user(user("Cat", "cat@example.com", 32.83, 35.11)).unwrap();
        dir.add_book(book("ann@example.com", "Dune", &["scifi"])).unwrap();
        dir.add_book(book("ann@example.com", "Hyperion", &["scifi"])).unwrap();
        dir.add_book(book("ben@example.com", "SPQR", &["history"])).unwrap();

        let shelves = dir.shelves(None);
        assert_eq!(shelves.len(), 2); // Cat owns nothing
        assert_eq!(shelves[0].user.name, "Ann");
        assert_eq!(shelves[0].books.len(), 2);
        assert_eq!(shelves[1].user.name, "Ben");
        assert_eq!(shelves[1].books.len(), 1);
    }

    #[test]
    fn test_shelves_category_filter() {
        let dir = Directory::new();
        dir.add_user(user("Ann", "ann@example.com", 32.85, 35.09)).unwrap();
        dir.add_user(user("Ben", "ben@example.com", 32.84, 35.10)).unwrap();
        dir.add_book(book("ann@example.com", "Dune", &["scifi"])).unwrap();
        dir.add_book(book("ann@example.com", "SPQR", &["history"])).unwrap();
        dir.add_book(book("ben@example.com", "Rubicon", &["history"])).unwrap();

        let history = dir.category_id("history").unwrap();
        let shelves = dir.shelves(Some(history));
        assert_eq!(shelves.len(), 2);
        assert_eq!(shelves[0].books.len(), 1);
        assert_eq!(shelves[0].books[0].name, "SPQR");
    }

    #[test]
    fn test_shelves_named_unknown_category_is_empty() {
        let dir = Directory::new();
        dir.add_user(user("Ann", "ann@example.com", 32.85, 35.09)).unwrap();
        dir.add_book(book("ann@example.com", "Dune", &["scifi"])).unwrap();

        assert!(dir.shelves_named(Some("knitting")).is_empty());
        assert_eq!(dir.shelves_named(Some("scifi")).len(), 1);
        assert_eq!(dir.shelves_named(None).len(), 1);
    }

    #[test]
    fn test_shelf_position_comes_from_owner() {
        let dir = Directory::new();
        let ann = dir.add_user(user("Ann", "ann@example.com", 32.85, 35.09)).unwrap();
        dir.add_book(book("ann@example.com", "Dune", &[])).unwrap();

        let shelves = dir.shelves(None);
        assert_eq!(shelves[0].id(), ann.id);
        assert_eq!(shelves[0].latitude(), 32.85);
        assert_eq!(shelves[0].longitude(), 35.09);
    }

    #[test]
    fn test_import_categories_deduplicates() {
        let dir = Directory::new();
        let file = temp_file("fantasy\nscifi\n\nfantasy\n  history  \n");

        let imported = dir.import_categories(file.path()).unwrap();
        assert_eq!(imported, 3);
        let names: Vec<String> = dir.categories(None).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["fantasy", "scifi", "history"]);
    }

    #[test]
    fn test_load_fixtures() {
        let dir = Directory::new();
        let file = temp_file(
            r#"{
                "categories": ["fantasy"],
                "users": [
                    {"name": "Ann", "email": "ann@example.com",
                     "address": "1 Main St",
                     "latitude": 32.85231, "longitude": 35.096149}
                ],
                "books": [
                    {"owner_email": "ann@example.com", "name": "Dune",
                     "author": "Frank Herbert", "description": "Sand.",
                     "publication_date": "1965-08-01",
                     "categories": ["scifi"]}
                ]
            }"#,
        );

        dir.load_fixtures(file.path()).unwrap();
        assert_eq!(dir.user_count(), 1);
        assert_eq!(dir.book_count(), 1);
        assert_eq!(dir.categories(None).len(), 2);
    }

    #[test]
    fn test_load_fixtures_unknown_owner_fails() {
        let dir = Directory::new();
        let file = temp_file(
            r#"{"books": [{"owner_email": "ghost@example.com", "name": "Dune",
                "author": "A", "description": "B",
                "publication_date": "1965-08-01"}]}"#,
        );

        assert!(dir.load_fixtures(file.path()).is_err());
    }
}
