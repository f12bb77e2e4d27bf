//! Reference ingredients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of an ingredient.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IngredientId(i64);

impl IngredientId {
    /// Wrap a raw database identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw database identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ingredient with its measurement unit; `(name, measurement_unit)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

/// Ingredient awaiting insertion by the bulk loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    name: String,
    measurement_unit: String,
}

impl NewIngredient {
    /// Trim and lower-case both parts; `None` when either part is blank.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::NewIngredient;
    ///
    /// let ingredient = NewIngredient::normalised(" Flour ", "G").expect("non-empty");
    /// assert_eq!(ingredient.name(), "flour");
    /// assert_eq!(ingredient.measurement_unit(), "g");
    /// ```
    pub fn normalised(name: &str, measurement_unit: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        let measurement_unit = measurement_unit.trim().to_lowercase();
        if name.is_empty() || measurement_unit.is_empty() {
            return None;
        }
        Some(Self {
            name,
            measurement_unit,
        })
    }

    /// Lower-cased name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased measurement unit.
    pub fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }
}

/// Optional case-insensitive name prefix used by the ingredient search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientFilter {
    name_prefix: Option<String>,
}

impl IngredientFilter {
    /// Build a filter; blank prefixes match everything.
    pub fn by_name_prefix(prefix: Option<&str>) -> Self {
        let name_prefix = prefix
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);
        Self { name_prefix }
    }

    /// Lower-cased prefix, if any.
    pub fn name_prefix(&self) -> Option<&str> {
        self.name_prefix.as_deref()
    }

    /// Whether `ingredient` satisfies the filter.
    pub fn matches(&self, ingredient: &Ingredient) -> bool {
        self.name_prefix
            .as_deref()
            .is_none_or(|prefix| ingredient.name.to_lowercase().starts_with(prefix))
    }
}
