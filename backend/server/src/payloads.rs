//! Request bodies. Every field defaults so a missing field and an empty one fail the same
//! non-empty check in the handler.
use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UserEntry {
    pub entry: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewDeck {
    pub name: String,
    pub desc: String,
    pub created_by: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewCard {
    pub image_path: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewDeckCard {
    pub card_id: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewGame {
    pub hive_name: String,
    pub hive_invitation_msg: String,
    pub hive_host_id: String,
    pub collective_postcard: Option<String>,
    pub deck_id: String,
    pub prompt: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewEntry {
    pub user_id: String,
    pub game_id: String,
    pub card_id: String,
    pub entry_text: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewPostcard {
    pub user_id: String,
    pub game_id: String,
    pub individual_postcard: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewMedia {
    pub id: Option<String>,
    pub order: String,
    pub media_name: String,
    pub media_path: String,
    pub text: String,
    pub linkie: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MediaUpdate {
    pub id: Option<String>,
    pub order: Option<String>,
    pub media_name: Option<String>,
    pub media_path: Option<String>,
    pub text: Option<String>,
    pub linkie: Option<String>,
}

impl MediaUpdate {
    /// Column name to new value, only for fields present in the body.
    pub fn into_updates(self) -> BTreeMap<String, String> {
        [
            ("id", self.id),
            ("order", self.order),
            ("media_name", self.media_name),
            ("media_path", self.media_path),
            ("text", self.text),
            ("linkie", self.linkie),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column.to_string(), v)))
        .collect()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct NewMediaEntry {
    pub media_id: String,
    pub entry_text: String,
    pub timestamp: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EntriesQuery {
    pub game_id: Option<String>,
}
