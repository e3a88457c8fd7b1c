//! Diesel table definitions matching `backend/migrations`.
//!
//! Keep these in step with the migrations; `diesel print-schema` against a
//! migrated database regenerates them.

diesel::table! {
    /// Movie catalogue.
    movies (id) {
        id -> Int8,
        created_at -> Timestamptz,
        title -> Text,
        year -> Int4,
        /// Minutes; rendered as `"<N> mins"` on the wire.
        runtime -> Int4,
        genres -> Array<Text>,
        /// Optimistic concurrency token, bumped on every update.
        version -> Int4,
    }
}

diesel::table! {
    /// User accounts. `email` is unique case-insensitively.
    users (id) {
        id -> Int8,
        created_at -> Timestamptz,
        name -> Text,
        email -> Text,
        /// Argon2id PHC string.
        password_hash -> Text,
        activated -> Bool,
        version -> Int4,
    }
}

diesel::allow_tables_to_appear_in_same_query!(movies, users);
