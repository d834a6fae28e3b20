diesel::table! {
    games (id) {
        id -> Int4,
        name -> Text,
        description -> Text,
        category -> Text,
        publisher -> Text,
        release_year -> Int4,
        popularity -> Int4,
    }
}

diesel::table! {
    guides (game_id, id) {
        game_id -> Int4,
        id -> Int4,
        title -> Text,
        author -> Text,
        content -> Text,
        likes -> Int4,
        created_on -> Date,
    }
}

diesel::table! {
    tier_lists (game_id, id) {
        game_id -> Int4,
        id -> Int4,
        title -> Text,
        author -> Text,
        content -> Text,
        votes -> Int4,
    }
}

diesel::joinable!(guides -> games (game_id));
diesel::joinable!(tier_lists -> games (game_id));

diesel::allow_tables_to_appear_in_same_query!(
    games,
    guides,
    tier_lists,
);
