//! Shopping-list aggregation and the plain-text report.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use chrono::NaiveDate;

use super::RecipeId;

/// One ingredient line of one recipe in a user's shopping cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    pub author_username: String,
    pub ingredient_name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Summed amount of one `(name, unit)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductTotal {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Recipe attribution line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRecipe {
    pub name: String,
    pub author_username: String,
}

/// Aggregated shopping list; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingList {
    products: Vec<ProductTotal>,
    recipes: Vec<CartRecipe>,
}

/// First character upper-cased, the rest lower-cased.
fn capitalise(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

impl ShoppingList {
    /// Aggregate cart rows; `None` when there is nothing to buy.
    ///
    /// Products are ordered by name then unit. Recipes are listed once each,
    /// ordered by name.
    pub fn aggregate(items: impl IntoIterator<Item = CartItem>) -> Option<Self> {
        let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
        let mut recipes: BTreeSet<(String, RecipeId, String)> = BTreeSet::new();
        for item in items {
            *totals
                .entry((item.ingredient_name, item.measurement_unit))
                .or_default() += i64::from(item.amount);
            recipes.insert((item.recipe_name, item.recipe_id, item.author_username));
        }
        if totals.is_empty() {
            return None;
        }
        Some(Self {
            products: totals
                .into_iter()
                .map(|((name, measurement_unit), total)| ProductTotal {
                    name,
                    measurement_unit,
                    total,
                })
                .collect(),
            recipes: recipes
                .into_iter()
                .map(|(name, _, author_username)| CartRecipe {
                    name,
                    author_username,
                })
                .collect(),
        })
    }

    pub fn products(&self) -> &[ProductTotal] {
        &self.products
    }

    pub fn recipes(&self) -> &[CartRecipe] {
        &self.recipes
    }

    /// Render the downloadable report dated `date`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use foodgram::domain::{CartItem, RecipeId, ShoppingList};
    ///
    /// let list = ShoppingList::aggregate([CartItem {
    ///     recipe_id: RecipeId::new(1),
    ///     recipe_name: "Omelette".into(),
    ///     author_username: "alice".into(),
    ///     ingredient_name: "eggs".into(),
    ///     measurement_unit: "pcs".into(),
    ///     amount: 2,
    /// }])
    /// .expect("non-empty cart");
    /// let date = NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date");
    /// assert!(list.render(date).contains("1. Eggs (pcs) — 2"));
    /// ```
    pub fn render(&self, date: NaiveDate) -> String {
        let mut report = format!("Foodgram shopping list for {}:\n", date.format("%d.%m.%Y"));
        report.push_str("\nProducts:");
        for (index, product) in self.products.iter().enumerate() {
            let _ = write!(
                report,
                "\n{}. {} ({}) — {}",
                index + 1,
                capitalise(&product.name),
                product.measurement_unit,
                product.total
            );
        }
        report.push_str("\n\nRecipes that need these products:");
        for (index, recipe) in self.recipes.iter().enumerate() {
            let _ = write!(
                report,
                "\n{}. {} — @{}",
                index + 1,
                recipe.name,
                recipe.author_username
            );
        }
        report
    }
}
