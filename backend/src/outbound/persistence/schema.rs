//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. The `diesel
//! print-schema` command can regenerate them from a live database.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        /// Unique login address (max 254 characters).
        email -> Varchar,
        /// Unique public handle (max 150 characters).
        username -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Hex-encoded SHA-256 digest of the password.
        password_digest -> Varchar,
        /// Avatar path relative to the media root.
        avatar -> Nullable<Varchar>,
        is_staff -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reference ingredients; `(name, measurement_unit)` is unique.
    ingredients (id) {
        id -> Int8,
        name -> Varchar,
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    /// Published recipes.
    recipes (id) {
        id -> Int8,
        author_id -> Int8,
        name -> Varchar,
        /// Image path relative to the media root.
        image -> Varchar,
        text -> Text,
        /// Minutes, at least 1.
        cooking_time -> Int4,
        pub_date -> Timestamptz,
    }
}

diesel::table! {
    /// Ingredient lines of a recipe.
    recipe_ingredients (id) {
        id -> Int8,
        recipe_id -> Int8,
        ingredient_id -> Int8,
        amount -> Int4,
    }
}

diesel::table! {
    /// Recipes a user marked as favourite.
    favorites (id) {
        id -> Int8,
        user_id -> Int8,
        recipe_id -> Int8,
    }
}

diesel::table! {
    /// Recipes a user plans to cook.
    shopping_carts (id) {
        id -> Int8,
        user_id -> Int8,
        recipe_id -> Int8,
    }
}

diesel::table! {
    /// `user_id` follows `author_id`.
    follows (id) {
        id -> Int8,
        user_id -> Int8,
        author_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(shopping_carts -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    ingredients,
    recipes,
    recipe_ingredients,
    favorites,
    shopping_carts,
    follows,
);
