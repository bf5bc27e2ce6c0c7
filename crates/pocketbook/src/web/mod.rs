//! Presentation layer: the tabbed HTML page and a JSON API over the same books.

mod api;
mod forms;
pub mod pages;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::books::Pocketbook;

/// Router builder exposing the page, its form endpoints, and `/api/v1`.
pub fn pocketbook_router(books: Arc<Pocketbook>) -> Router {
    Router::new()
        .route("/", get(forms::index))
        .route("/candidates", post(forms::submit_candidate))
        .route("/rates/record", post(forms::record_rate))
        .route("/vocabulary", post(forms::submit_vocabulary))
        .route("/vocabulary/delete", post(forms::delete_vocabulary))
        .route("/vocabulary.csv", get(forms::vocabulary_csv))
        .route("/phrases", post(forms::submit_phrase))
        .route("/phrases/delete", post(forms::delete_phrase))
        .route("/phrases/:id/audio/:language", get(forms::phrase_audio))
        .route(
            "/api/v1/candidates",
            get(api::list_candidates).post(api::create_candidate),
        )
        .route("/api/v1/rates", get(api::rate_history).post(api::record_rate))
        .route("/api/v1/rates/current", get(api::current_rate))
        .route(
            "/api/v1/vocabulary",
            get(api::list_vocabulary).post(api::create_vocabulary),
        )
        .route("/api/v1/vocabulary/:id", delete(api::delete_vocabulary))
        .route(
            "/api/v1/phrases",
            get(api::list_phrases).post(api::create_phrase),
        )
        .route("/api/v1/phrases/:id", delete(api::delete_phrase))
        .route(
            "/api/v1/phrases/:id/audio/:language",
            get(forms::phrase_audio),
        )
        .with_state(books)
}
