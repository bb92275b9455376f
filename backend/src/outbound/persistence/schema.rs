//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Media path relative to the media root.
        avatar -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges. `user_id` follows `author_id`.
    follows (id) {
        id -> Int8,
        user_id -> Int8,
        author_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tags (id) {
        id -> Int8,
        name -> Varchar,
        slug -> Varchar,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Int8,
        name -> Varchar,
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int8,
        author_id -> Int8,
        name -> Varchar,
        image -> Text,
        /// Exposed as `text` over HTTP.
        description -> Text,
        cooking_time -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    recipe_ingredients (id) {
        id -> Int8,
        recipe_id -> Int8,
        ingredient_id -> Int8,
        amount -> Int4,
    }
}

diesel::table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    favorites (id) {
        id -> Int8,
        user_id -> Int8,
        recipe_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    shopping_cart (id) {
        id -> Int8,
        user_id -> Int8,
        recipe_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    recipe_short_links (id) {
        id -> Int8,
        recipe_id -> Int8,
        short_url -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(shopping_cart -> recipes (recipe_id));
diesel::joinable!(recipe_short_links -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    follows,
    tags,
    ingredients,
    recipes,
    recipe_ingredients,
    recipe_tags,
    favorites,
    shopping_cart,
    recipe_short_links,
);
