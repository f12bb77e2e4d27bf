//! Recipes: stored records, write payload validation, and read models.
//!
//! Writes arrive as a loosely typed [`RecipeInput`] so that type errors in
//! individual fields are reported alongside missing fields instead of failing
//! the whole body. [`RecipeInput::validate`] turns it into a [`RecipeDraft`]
//! according to the [`WriteMode`] of the request.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::image::{INVALID_IMAGE, ImageUpload};
use super::validation::{FIELD_REQUIRED, FieldErrors};
use super::{Error, IngredientId, UserId, UserProfile};

/// Message for fields omitted from a partial update.
pub const FIELD_REQUIRED_FOR_UPDATE: &str = "This field is required for update.";
/// Message for an image omitted from a full replace.
pub const FIELD_REQUIRED_FOR_PUT: &str = "This field is required for PUT.";
/// Message for an empty ingredient list.
pub const INGREDIENTS_EMPTY: &str = "Please specify ingredients.";
/// Message for a repeated ingredient id.
pub const INGREDIENTS_REPEAT: &str = "Ingredients must not repeat.";
/// Message for an ingredient amount below one.
pub const AMOUNT_TOO_SMALL: &str = "Amount must be at least 1.";
/// Message for a non-integer number.
pub const INVALID_INTEGER: &str = "A valid integer is required.";
/// Message for a non-list ingredients field.
pub const INVALID_LIST: &str = "Expected a list of items.";

const NAME_MAX: usize = 256;
const SMALL_INT_MAX: i64 = 32_767;

/// Primary key of a recipe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
    /// Wrap a raw database identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw database identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecipeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Stored recipe row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub author_id: UserId,
    pub name: String,
    /// Relative path of the stored image.
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

impl Recipe {
    /// Whether `user` may edit or delete this recipe.
    pub fn can_be_modified_by(&self, user: &super::User) -> bool {
        user.is_staff || user.id == self.author_id
    }

    /// Minified read model.
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            cooking_time: self.cooking_time,
        }
    }
}

/// One ingredient of a recipe as supplied by the author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: IngredientId,
    pub amount: i32,
}

/// One ingredient of a recipe as shown to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredientLine {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// `{id, name, image, cooking_time}` view used by membership toggles and
/// subscription listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Full recipe as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub id: RecipeId,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientLine>,
    /// Always false for anonymous viewers.
    pub is_favorited: bool,
    /// Always false for anonymous viewers.
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// How strictly a write payload is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// `POST`: every field, image included, is required.
    Create,
    /// `PUT`: as create; a missing image gets its own message.
    Replace,
    /// `PATCH`: the image may be omitted, every other field is still required.
    Patch,
}

impl WriteMode {
    const fn missing_message(self) -> &'static str {
        match self {
            Self::Create | Self::Replace => FIELD_REQUIRED,
            Self::Patch => FIELD_REQUIRED_FOR_UPDATE,
        }
    }
}

/// A submitted value that either parsed or carries the reason it did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted<T> {
    Value(T),
    Invalid(&'static str),
}

/// One `{id, amount}` entry of the ingredients field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientAmountInput {
    pub id: Option<Submitted<i64>>,
    pub amount: Option<Submitted<i64>>,
}

/// Raw recipe write payload; `None` means the field was omitted.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<Submitted<i64>>,
    pub image: Option<Submitted<ImageUpload>>,
    pub ingredients: Option<Submitted<Vec<IngredientAmountInput>>>,
}

/// Validated recipe payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    /// `None` keeps the stored image (partial updates only).
    pub image: Option<ImageUpload>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Recipe fields handed to the repository once the image has been stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeWrite {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    /// Relative image path; `None` keeps the stored image on update.
    pub image: Option<String>,
    pub ingredients: Vec<IngredientAmount>,
}

fn text_field(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    mode: WriteMode,
    max: Option<usize>,
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, mode.missing_message());
        return None;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "This field may not be blank.");
        return None;
    }
    if let Some(max) = max.filter(|max| trimmed.chars().count() > *max) {
        errors.add(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
        return None;
    }
    Some(trimmed.to_owned())
}

fn bounded_int(errors: &mut FieldErrors, field: &str, value: i64, below_min: &str) -> Option<i32> {
    if value < 1 {
        errors.add(field, below_min);
        return None;
    }
    if value > SMALL_INT_MAX {
        errors.add(
            field,
            format!("Ensure this value is less than or equal to {SMALL_INT_MAX}."),
        );
        return None;
    }
    i32::try_from(value).ok()
}

fn ingredient_entries(
    errors: &mut FieldErrors,
    entries: Vec<IngredientAmountInput>,
) -> Option<Vec<IngredientAmount>> {
    const FIELD: &str = "ingredients";
    if entries.is_empty() {
        errors.add(FIELD, INGREDIENTS_EMPTY);
        return None;
    }

    let before = errors.clone();
    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = match entry.id {
            None => {
                errors.add(FIELD, FIELD_REQUIRED);
                None
            }
            Some(Submitted::Invalid(message)) => {
                errors.add(FIELD, message);
                None
            }
            Some(Submitted::Value(raw)) => Some(IngredientId::new(raw)),
        };
        let amount = match entry.amount {
            None => {
                errors.add(FIELD, FIELD_REQUIRED);
                None
            }
            Some(Submitted::Invalid(message)) => {
                errors.add(FIELD, message);
                None
            }
            Some(Submitted::Value(raw)) => bounded_int(errors, FIELD, raw, AMOUNT_TOO_SMALL),
        };
        if let (Some(ingredient_id), Some(amount)) = (id, amount) {
            parsed.push(IngredientAmount {
                ingredient_id,
                amount,
            });
        }
    }
    if *errors != before {
        return None;
    }

    let mut seen = HashSet::with_capacity(parsed.len());
    if !parsed.iter().all(|entry| seen.insert(entry.ingredient_id)) {
        errors.add(FIELD, INGREDIENTS_REPEAT);
        return None;
    }
    Some(parsed)
}

impl RecipeInput {
    /// Validate the payload for `mode`, reporting every field problem at once.
    ///
    /// Ingredient existence is not checked here; that needs the repository.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::{IngredientAmountInput, RecipeInput, Submitted, WriteMode};
    ///
    /// let input = RecipeInput {
    ///     name: Some("Omelette".into()),
    ///     text: Some("Whisk and fry.".into()),
    ///     cooking_time: Some(Submitted::Value(10)),
    ///     image: None,
    ///     ingredients: Some(Submitted::Value(vec![IngredientAmountInput {
    ///         id: Some(Submitted::Value(1)),
    ///         amount: Some(Submitted::Value(2)),
    ///     }])),
    /// };
    /// let draft = input.validate(WriteMode::Patch).expect("patch keeps the image");
    /// assert!(draft.image.is_none());
    /// ```
    pub fn validate(self, mode: WriteMode) -> Result<RecipeDraft, Error> {
        let mut errors = FieldErrors::default();

        let name = text_field(&mut errors, "name", self.name, mode, Some(NAME_MAX));
        let text = text_field(&mut errors, "text", self.text, mode, None);

        let cooking_time = match self.cooking_time {
            None => {
                errors.add("cooking_time", mode.missing_message());
                None
            }
            Some(Submitted::Invalid(message)) => {
                errors.add("cooking_time", message);
                None
            }
            Some(Submitted::Value(raw)) => bounded_int(
                &mut errors,
                "cooking_time",
                raw,
                "Ensure this value is greater than or equal to 1.",
            ),
        };

        let image = match (self.image, mode) {
            (Some(Submitted::Value(image)), _) => Some(image),
            (Some(Submitted::Invalid(message)), _) => {
                errors.add("image", message);
                None
            }
            (None, WriteMode::Create) => {
                errors.add("image", FIELD_REQUIRED);
                None
            }
            (None, WriteMode::Replace) => {
                errors.add("image", FIELD_REQUIRED_FOR_PUT);
                None
            }
            (None, WriteMode::Patch) => None,
        };

        let ingredients = match self.ingredients {
            None => {
                errors.add("ingredients", mode.missing_message());
                None
            }
            Some(Submitted::Invalid(message)) => {
                errors.add("ingredients", message);
                None
            }
            Some(Submitted::Value(entries)) => ingredient_entries(&mut errors, entries),
        };

        match (name, text, cooking_time, ingredients) {
            (Some(name), Some(text), Some(cooking_time), Some(ingredients))
                if errors.is_empty() =>
            {
                Ok(RecipeDraft {
                    name,
                    text,
                    cooking_time,
                    image,
                    ingredients,
                })
            }
            _ => Err(errors.into_error()),
        }
    }
}

impl RecipeDraft {
    /// Identifiers of every referenced ingredient, in submission order.
    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        self.ingredients
            .iter()
            .map(|entry| entry.ingredient_id)
            .collect()
    }

    /// Attach the stored image path, dropping the decoded bytes.
    pub fn into_write(self, image: Option<String>) -> RecipeWrite {
        RecipeWrite {
            name: self.name,
            text: self.text,
            cooking_time: self.cooking_time,
            image,
            ingredients: self.ingredients,
        }
    }
}

/// Validation error for ingredient ids that do not exist.
pub fn unknown_ingredients_error(missing: &[IngredientId]) -> Error {
    let mut errors = FieldErrors::default();
    for id in missing {
        errors.add(
            "ingredients",
            format!("Invalid pk \"{id}\" - object does not exist."),
        );
    }
    errors.into_error()
}
