use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use tables::{
    Record, new_id,
    models::{Card, Deck, DeckCard, Entry, Game, Media, MediaEntry, SoloPostcard, User},
    repository,
};
use tracing::info;

use crate::{
    error::AppError,
    payloads::{
        EntriesQuery, MediaUpdate, NewCard, NewDeck, NewDeckCard, NewEntry, NewGame, NewMedia,
        NewMediaEntry, NewPostcard, NewUser, UserEntry,
    },
    state::AppState,
    utils::{Payload, is_empty_body, non_blank, require_non_empty, timestamp},
};

type Shared = State<Arc<AppState>>;
type JsonResult<T> = Result<Json<T>, AppError>;
type Created<T> = Result<(StatusCode, Json<T>), AppError>;

const SERVICE: &str = "API Routes Module";
const API_VERSION: &str = "1.0.2";

pub async fn home_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the API",
        "version": API_VERSION,
        "status": "running",
        "timestamp": timestamp(),
    }))
}

pub async fn test_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Test route working helooo",
        "service": SERVICE,
        "timestamp": timestamp(),
    }))
}

pub async fn custom_handler() -> impl IntoResponse {
    Json(json!({
        "message": "hiiiiii",
        "service": SERVICE,
        "timestamp": timestamp(),
    }))
}

pub async fn user_entry_handler(Payload(payload): Payload<UserEntry>) -> JsonResult<Value> {
    require_non_empty(&[("entry", &payload.entry)])?;

    Ok(Json(json!({
        "message": format!("here is yr{}", payload.entry),
        "service": SERVICE,
        "timestamp": timestamp(),
    })))
}

pub async fn list_items_handler() -> impl IntoResponse {
    Json(json!([
        { "id": 1, "name": "Item 1" },
        { "id": 2, "name": "Item 2" },
    ]))
}

pub async fn create_item_handler(Payload(data): Payload<Value>) -> JsonResult<Value> {
    if is_empty_body(&data) {
        return Err(AppError::MalformedPayload("No data provided".into()));
    }

    Ok(Json(json!({
        "message": "Item created",
        "data": data,
    })))
}

pub async fn get_item_handler(Path(id): Path<String>) -> JsonResult<Value> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::MalformedPayload(format!("item id must be an integer, got {id}")))?;

    Ok(Json(json!({ "id": id, "name": format!("Item {id}") })))
}

pub async fn list_users_handler(State(state): Shared) -> JsonResult<Vec<User>> {
    Ok(Json(repository::list(state.store.as_ref()).await?))
}

pub async fn get_user_handler(State(state): Shared, Path(id): Path<String>) -> JsonResult<User> {
    found(state.as_ref(), &id, "User").await.map(Json)
}

pub async fn create_user_handler(
    State(state): Shared,
    Payload(payload): Payload<NewUser>,
) -> Created<User> {
    require_non_empty(&[("name", &payload.name)])?;

    let user = User {
        id: new_id(),
        name: payload.name,
        email: payload.email,
        created_at: timestamp(),
    };

    created(state.as_ref(), user).await
}

pub async fn list_decks_handler(State(state): Shared) -> JsonResult<Vec<Deck>> {
    Ok(Json(repository::list(state.store.as_ref()).await?))
}

pub async fn get_deck_handler(State(state): Shared, Path(id): Path<String>) -> JsonResult<Deck> {
    found(state.as_ref(), &id, "Deck").await.map(Json)
}

pub async fn create_deck_handler(
    State(state): Shared,
    Payload(payload): Payload<NewDeck>,
) -> Created<Deck> {
    require_non_empty(&[("name", &payload.name), ("created_by", &payload.created_by)])?;

    let deck = Deck {
        id: new_id(),
        name: payload.name,
        desc: payload.desc,
        created_at: timestamp(),
        created_by: payload.created_by,
    };

    created(state.as_ref(), deck).await
}

pub async fn deck_cards_handler(
    State(state): Shared,
    Path(id): Path<String>,
) -> JsonResult<Vec<Card>> {
    let store = state.store.as_ref();
    found::<Deck>(state.as_ref(), &id, "Deck").await?;

    let links: Vec<DeckCard> = repository::filter(store, "deck_id", &id).await?;
    let cards: Vec<Card> = repository::list(store).await?;

    Ok(Json(
        cards
            .into_iter()
            .filter(|card| links.iter().any(|link| link.card_id == card.id))
            .collect(),
    ))
}

pub async fn add_deck_card_handler(
    State(state): Shared,
    Path(id): Path<String>,
    Payload(payload): Payload<NewDeckCard>,
) -> Created<DeckCard> {
    require_non_empty(&[("card_id", &payload.card_id)])?;

    found::<Deck>(state.as_ref(), &id, "Deck").await?;
    found::<Card>(state.as_ref(), &payload.card_id, "Card").await?;

    let link = DeckCard {
        deck_id: id,
        card_id: payload.card_id,
    };

    created(state.as_ref(), link).await
}

pub async fn list_cards_handler(State(state): Shared) -> JsonResult<Vec<Card>> {
    Ok(Json(repository::list(state.store.as_ref()).await?))
}

pub async fn get_card_handler(State(state): Shared, Path(id): Path<String>) -> JsonResult<Card> {
    found(state.as_ref(), &id, "Card").await.map(Json)
}

pub async fn create_card_handler(
    State(state): Shared,
    Payload(payload): Payload<NewCard>,
) -> Created<Card> {
    require_non_empty(&[("image_path", &payload.image_path)])?;

    let card = Card {
        id: new_id(),
        image_path: payload.image_path,
    };

    created(state.as_ref(), card).await
}

pub async fn list_games_handler(State(state): Shared) -> JsonResult<Vec<Game>> {
    Ok(Json(repository::list(state.store.as_ref()).await?))
}

pub async fn get_game_handler(State(state): Shared, Path(id): Path<String>) -> JsonResult<Game> {
    found(state.as_ref(), &id, "Game").await.map(Json)
}

pub async fn create_game_handler(
    State(state): Shared,
    Payload(payload): Payload<NewGame>,
) -> Created<Game> {
    require_non_empty(&[
        ("hive_name", &payload.hive_name),
        ("hive_host_id", &payload.hive_host_id),
        ("deck_id", &payload.deck_id),
    ])?;

    let game = Game {
        id: new_id(),
        hive_name: payload.hive_name,
        hive_invitation_msg: payload.hive_invitation_msg,
        hive_host_id: payload.hive_host_id,
        collective_postcard: non_blank(payload.collective_postcard),
        deck_id: payload.deck_id,
        prompt: payload.prompt,
        created_at: timestamp(),
    };

    created(state.as_ref(), game).await
}

pub async fn game_entries_handler(
    State(state): Shared,
    Path(id): Path<String>,
) -> JsonResult<Vec<Entry>> {
    found::<Game>(state.as_ref(), &id, "Game").await?;

    Ok(Json(
        repository::filter(state.store.as_ref(), "game_id", &id).await?,
    ))
}

pub async fn game_postcards_handler(
    State(state): Shared,
    Path(id): Path<String>,
) -> JsonResult<Vec<SoloPostcard>> {
    found::<Game>(state.as_ref(), &id, "Game").await?;

    Ok(Json(
        repository::filter(state.store.as_ref(), "game_id", &id).await?,
    ))
}

pub async fn create_entry_handler(
    State(state): Shared,
    Payload(payload): Payload<NewEntry>,
) -> Created<Entry> {
    require_non_empty(&[
        ("user_id", &payload.user_id),
        ("game_id", &payload.game_id),
        ("card_id", &payload.card_id),
    ])?;

    let entry = Entry {
        id: new_id(),
        user_id: payload.user_id,
        game_id: payload.game_id,
        card_id: payload.card_id,
        entry_text: payload.entry_text,
        created_at: timestamp(),
    };

    created(state.as_ref(), entry).await
}

pub async fn list_entries_handler(
    State(state): Shared,
    Query(query): Query<EntriesQuery>,
) -> JsonResult<Vec<Entry>> {
    let store = state.store.as_ref();

    let entries = match non_blank(query.game_id) {
        Some(game_id) => repository::filter(store, "game_id", &game_id).await?,
        None => repository::list(store).await?,
    };

    Ok(Json(entries))
}

pub async fn create_postcard_handler(
    State(state): Shared,
    Payload(payload): Payload<NewPostcard>,
) -> Created<SoloPostcard> {
    require_non_empty(&[("user_id", &payload.user_id), ("game_id", &payload.game_id)])?;

    let postcard = SoloPostcard {
        id: new_id(),
        user_id: payload.user_id,
        game_id: payload.game_id,
        individual_postcard: non_blank(payload.individual_postcard),
    };

    created(state.as_ref(), postcard).await
}

pub async fn list_media_handler(State(state): Shared) -> JsonResult<Vec<Media>> {
    Ok(Json(repository::list(state.store.as_ref()).await?))
}

pub async fn create_media_handler(
    State(state): Shared,
    Payload(payload): Payload<NewMedia>,
) -> Created<Media> {
    let media = Media {
        id: non_blank(payload.id).unwrap_or_else(new_id),
        order: payload.order,
        media_name: payload.media_name,
        media_path: payload.media_path,
        text: payload.text,
        linkie: payload.linkie,
    };

    created(state.as_ref(), media).await
}

pub async fn update_media_handler(
    State(state): Shared,
    Path(id): Path<String>,
    Payload(payload): Payload<MediaUpdate>,
) -> JsonResult<Media> {
    let updates = payload.into_updates();
    if updates.is_empty() {
        return Err(AppError::MalformedPayload("No fields to update".into()));
    }

    let media = repository::update(state.store.as_ref(), &id, &updates)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media {id}")))?;

    info!("Updated media {id}");

    Ok(Json(media))
}

pub async fn list_media_entries_handler(State(state): Shared) -> JsonResult<Vec<MediaEntry>> {
    Ok(Json(repository::list(state.store.as_ref()).await?))
}

pub async fn create_media_entry_handler(
    State(state): Shared,
    Payload(payload): Payload<NewMediaEntry>,
) -> Created<MediaEntry> {
    require_non_empty(&[("media_id", &payload.media_id)])?;

    let entry = MediaEntry {
        media_id: payload.media_id,
        entry_text: payload.entry_text,
        timestamp: non_blank(payload.timestamp).unwrap_or_else(timestamp),
    };

    created(state.as_ref(), entry).await
}

pub async fn handle_404() -> AppError {
    AppError::NotFound("Resource".into())
}

async fn found<R: Record>(state: &AppState, id: &str, kind: &str) -> Result<R, AppError> {
    repository::find(state.store.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{kind} {id}")))
}

async fn created<R: Record>(state: &AppState, record: R) -> Created<R> {
    repository::insert(state.store.as_ref(), &record).await?;
    info!("Created {} row", R::TABLE);

    Ok((StatusCode::CREATED, Json(record)))
}
