//! # Records
//!
//! One struct per table. Cells are stored as plain strings, references between tables are
//! ids by convention and nothing checks them on disk.
//!
//! ```text
//! User ─┬─< Deck ──< DeckCard >── Card
//!       ├─< Game (hive_host_id, deck_id)
//!       ├─< Entry (game_id, card_id)
//!       └─< SoloPostcard (game_id)
//!
//! Media ──< MediaEntry (media_id)
//! ```
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// CSV file stem and sheet tab name.
    const TABLE: &'static str;

    /// Header order on disk.
    const COLUMNS: &'static [&'static str];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl Record for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "created_at"];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub created_at: String,
    pub created_by: String,
}

impl Record for Deck {
    const TABLE: &'static str = "decks";
    const COLUMNS: &'static [&'static str] = &["id", "name", "desc", "created_at", "created_by"];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Card {
    pub id: String,
    pub image_path: String,
}

impl Record for Card {
    const TABLE: &'static str = "cards";
    const COLUMNS: &'static [&'static str] = &["id", "image_path"];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Game {
    pub id: String,
    pub hive_name: String,
    pub hive_invitation_msg: String,
    pub hive_host_id: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub collective_postcard: Option<String>,
    pub deck_id: String,
    pub prompt: String,
    pub created_at: String,
}

impl Record for Game {
    const TABLE: &'static str = "games";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "hive_name",
        "hive_invitation_msg",
        "hive_host_id",
        "collective_postcard",
        "deck_id",
        "prompt",
        "created_at",
    ];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Entry {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    pub card_id: String,
    pub entry_text: String,
    pub created_at: String,
}

impl Record for Entry {
    const TABLE: &'static str = "entries";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "game_id",
        "card_id",
        "entry_text",
        "created_at",
    ];
}

/// Junction between decks and cards. Has no id column of its own.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DeckCard {
    pub deck_id: String,
    pub card_id: String,
}

impl Record for DeckCard {
    const TABLE: &'static str = "deck_cards";
    const COLUMNS: &'static [&'static str] = &["deck_id", "card_id"];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SoloPostcard {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub individual_postcard: Option<String>,
}

impl Record for SoloPostcard {
    const TABLE: &'static str = "solo_postcards";
    const COLUMNS: &'static [&'static str] = &["id", "user_id", "game_id", "individual_postcard"];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Media {
    pub id: String,
    pub order: String,
    pub media_name: String,
    pub media_path: String,
    pub text: String,
    pub linkie: String,
}

impl Record for Media {
    const TABLE: &'static str = "media";
    const COLUMNS: &'static [&'static str] =
        &["id", "order", "media_name", "media_path", "text", "linkie"];
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MediaEntry {
    pub media_id: String,
    pub entry_text: String,
    pub timestamp: String,
}

impl Record for MediaEntry {
    const TABLE: &'static str = "media_entries";
    const COLUMNS: &'static [&'static str] = &["media_id", "entry_text", "timestamp"];
}

/// Empty cells come back as `""`; optional URL columns treat that as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;

    Ok(value.filter(|s| !s.is_empty()))
}
