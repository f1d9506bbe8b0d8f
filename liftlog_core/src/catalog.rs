//! Exercise category catalog.
//!
//! Maps known exercise names to the body-part category they train. The
//! catalog is immutable once built; adding exercises means building a new
//! catalog with [`CategoryCatalog::extended`].

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Returned by lookups for exercises the catalog does not know
pub const CATEGORY_NOT_FOUND: &str = "Category not found";

/// Categories offered when logging a workout
pub const KNOWN_CATEGORIES: &[&str] = &[
    "Shoulders",
    "Back",
    "Chest",
    "Biceps",
    "Legs",
    "Triceps",
    "Cardio",
    "Abs",
    "Grip",
];

/// Cached default catalog - built once and reused across all lookups
static DEFAULT_CATALOG: Lazy<CategoryCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static CategoryCatalog {
    &DEFAULT_CATALOG
}

/// Exact-match lookup in the default catalog.
///
/// Unknown names return [`CATEGORY_NOT_FOUND`] rather than an error.
pub fn exercise_category(name: &str) -> &'static str {
    get_default_catalog().category(name)
}

/// Immutable exercise name -> category mapping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCatalog {
    entries: HashMap<String, String>,
}

/// Builds the default catalog with the built-in exercises
pub fn build_default_catalog() -> CategoryCatalog {
    let entries = [
        ("Hanging Leg Raise", "Abs"),
        ("Barbell Squat", "Legs"),
        ("Deadlift", "Back"),
        ("Flat Barbell Bench Press", "Chest"),
    ]
    .into_iter()
    .map(|(name, category)| (name.to_string(), category.to_string()))
    .collect();

    CategoryCatalog { entries }
}

impl CategoryCatalog {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Category for `name`, or [`CATEGORY_NOT_FOUND`]
    pub fn category(&self, name: &str) -> &str {
        self.entries
            .get(name)
            .map(String::as_str)
            .unwrap_or(CATEGORY_NOT_FOUND)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a new catalog with `extra` entries layered over this one.
    ///
    /// Extra entries win on name collisions. `self` is left untouched.
    pub fn extended<'a, I>(&self, extra: I) -> CategoryCatalog
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut entries = self.entries.clone();
        for (name, category) in extra {
            if let Some(previous) = entries.insert(name.clone(), category.clone()) {
                tracing::debug!(
                    "Category for {:?} overridden: {} -> {}",
                    name,
                    previous,
                    category
                );
            }
        }
        CategoryCatalog { entries }
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, category) in &self.entries {
            if name.trim().is_empty() {
                errors.push("Catalog has an entry with an empty exercise name".to_string());
            }
            if name == crate::BODYWEIGHT {
                errors.push(format!(
                    "Exercise name '{}' is reserved for bodyweight series",
                    name
                ));
            }
            if category.is_empty() {
                errors.push(format!("Exercise '{}' has empty category", name));
            } else if category == CATEGORY_NOT_FOUND {
                errors.push(format!(
                    "Exercise '{}' uses the lookup sentinel as its category",
                    name
                ));
            }
        }

        errors
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        get_default_catalog().clone()
    }
}
