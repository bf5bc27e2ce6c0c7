use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::books::{
    Candidate, CandidateForm, ExchangeRateSample, PhraseEntry, PhraseForm, Pocketbook,
    RateRecording, VocabularyEntry, VocabularyForm,
};
use crate::enrichment::{Language, RateQuote};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteResponse {
    id: i64,
    deleted: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AudioPayload {
    language: Language,
    content_type: String,
    base64: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PhraseResponse {
    entry: PhraseEntry,
    translation_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<AudioPayload>,
}

pub(crate) async fn list_candidates(
    State(books): State<Arc<Pocketbook>>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    Ok(Json(books.candidates.list(search.q.as_deref()).await?))
}

pub(crate) async fn create_candidate(
    State(books): State<Arc<Pocketbook>>,
    Json(form): Json<CandidateForm>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    let candidate = books
        .candidates
        .register(form)
        .await?
        .ok_or(AppError::MissingFields("name, skill, target_country"))?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

pub(crate) async fn current_rate(State(books): State<Arc<Pocketbook>>) -> Json<RateQuote> {
    Json(books.rates.current().await)
}

pub(crate) async fn rate_history(
    State(books): State<Arc<Pocketbook>>,
) -> Result<Json<Vec<ExchangeRateSample>>, AppError> {
    Ok(Json(books.rates.history().await?))
}

pub(crate) async fn record_rate(
    State(books): State<Arc<Pocketbook>>,
) -> Result<(StatusCode, Json<RateRecording>), AppError> {
    let recording = books.rates.record().await?;
    let status = if recording.sample.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(recording)))
}

pub(crate) async fn list_vocabulary(
    State(books): State<Arc<Pocketbook>>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Vec<VocabularyEntry>>, AppError> {
    Ok(Json(books.vocabulary.list(search.q.as_deref()).await?))
}

pub(crate) async fn create_vocabulary(
    State(books): State<Arc<Pocketbook>>,
    Json(form): Json<VocabularyForm>,
) -> Result<(StatusCode, Json<VocabularyEntry>), AppError> {
    let entry = books
        .vocabulary
        .add(form)
        .await?
        .ok_or(AppError::MissingFields("german, japanese"))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub(crate) async fn delete_vocabulary(
    State(books): State<Arc<Pocketbook>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = books.vocabulary.delete(id).await?;
    Ok(Json(DeleteResponse { id, deleted }))
}

pub(crate) async fn list_phrases(
    State(books): State<Arc<Pocketbook>>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Vec<PhraseEntry>>, AppError> {
    Ok(Json(books.phrases.list(search.q.as_deref()).await?))
}

pub(crate) async fn create_phrase(
    State(books): State<Arc<Pocketbook>>,
    Json(form): Json<PhraseForm>,
) -> Result<(StatusCode, Json<PhraseResponse>), AppError> {
    let outcome = books
        .phrases
        .add(form)
        .await?
        .ok_or(AppError::MissingFields("japanese"))?;

    let audio = outcome.audio.map(|clip| AudioPayload {
        language: clip.language,
        content_type: clip.content_type,
        base64: STANDARD.encode(&clip.bytes),
    });

    Ok((
        StatusCode::CREATED,
        Json(PhraseResponse {
            entry: outcome.entry,
            translation_failed: outcome.translation_failed,
            audio,
        }),
    ))
}

pub(crate) async fn delete_phrase(
    State(books): State<Arc<Pocketbook>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = books.phrases.delete(id).await?;
    Ok(Json(DeleteResponse { id, deleted }))
}
