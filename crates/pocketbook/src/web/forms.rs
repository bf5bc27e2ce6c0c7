//! Handlers behind the HTML page. Posts end in a redirect back to the page so
//! a reload never re-submits, except `POST /phrases`, which renders the page
//! inline to play the fresh audio; reloading that response posts the phrase
//! again.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::{Deserialize, Deserializer};

use super::pages::{render_page, Banner, Tab, TabContent};
use crate::books::{write_csv, CandidateForm, Pocketbook, PhraseForm, VocabularyForm};
use crate::enrichment::Language;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default, deserialize_with = "lenient_tab")]
    tab: Tab,
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    notice: Option<String>,
    #[serde(default)]
    warning: Option<String>,
}

// Unknown tab names fall back to the default tab instead of rejecting the query.
fn lenient_tab<'de, D>(deserializer: D) -> Result<Tab, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(Tab::from_slug(&raw).unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteForm {
    id: i64,
}

pub(crate) async fn index(
    State(books): State<Arc<Pocketbook>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let PageQuery {
        tab,
        q,
        notice,
        warning,
    } = query;
    let search = q.unwrap_or_default();
    let content = load_tab(&books, tab, &search).await?;
    let banner = Banner { notice, warning };
    Ok(Html(render_page(&content, &banner)))
}

async fn load_tab(books: &Pocketbook, tab: Tab, search: &str) -> Result<TabContent, AppError> {
    let content = match tab {
        Tab::Candidates => {
            let all = books.candidates.list(None).await?;
            let total = all.len();
            TabContent::Candidates {
                rows: crate::books::filter_rows(all, Some(search)),
                total,
                search: search.to_string(),
            }
        }
        Tab::Rates => TabContent::Rates {
            current: books.rates.current().await,
            history: books.rates.history().await?,
        },
        Tab::Vocabulary => {
            let all = books.vocabulary.list(None).await?;
            let total = all.len();
            TabContent::Vocabulary {
                rows: crate::books::filter_rows(all, Some(search)),
                total,
                search: search.to_string(),
            }
        }
        Tab::Phrases => {
            let all = books.phrases.list(None).await?;
            let total = all.len();
            TabContent::Phrases {
                rows: crate::books::filter_rows(all, Some(search)),
                total,
                search: search.to_string(),
                fresh_audio: None,
            }
        }
    };
    Ok(content)
}

pub(crate) async fn submit_candidate(
    State(books): State<Arc<Pocketbook>>,
    Form(form): Form<CandidateForm>,
) -> Result<Redirect, AppError> {
    let notice = books
        .candidates
        .register(form)
        .await?
        .map(|candidate| format!("Registered {}", candidate.name));
    Ok(back_to(Tab::Candidates, notice, None))
}

pub(crate) async fn record_rate(State(books): State<Arc<Pocketbook>>) -> Result<Redirect, AppError> {
    let recording = books.rates.record().await?;
    let redirect = match recording.sample {
        Some(sample) => back_to(
            Tab::Rates,
            Some(format!("Recorded {} at {:.4}", sample.pair, sample.rate)),
            None,
        ),
        None => back_to(Tab::Rates, None, recording.quote.warning),
    };
    Ok(redirect)
}

pub(crate) async fn submit_vocabulary(
    State(books): State<Arc<Pocketbook>>,
    Form(form): Form<VocabularyForm>,
) -> Result<Redirect, AppError> {
    let notice = books
        .vocabulary
        .add(form)
        .await?
        .map(|entry| format!("Saved {}", entry.german));
    Ok(back_to(Tab::Vocabulary, notice, None))
}

pub(crate) async fn delete_vocabulary(
    State(books): State<Arc<Pocketbook>>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    let removed = books.vocabulary.delete(form.id).await?;
    let warning = removed.then(|| "Entry deleted".to_string());
    Ok(back_to(Tab::Vocabulary, None, warning))
}

/// Renders directly instead of redirecting so the freshly synthesized audio
/// can be played once without being stored anywhere.
pub(crate) async fn submit_phrase(
    State(books): State<Arc<Pocketbook>>,
    Form(form): Form<PhraseForm>,
) -> Result<Response, AppError> {
    let Some(outcome) = books.phrases.add(form).await? else {
        return Ok(back_to(Tab::Phrases, None, None).into_response());
    };

    let all = books.phrases.list(None).await?;
    let content = TabContent::Phrases {
        total: all.len(),
        rows: all,
        search: String::new(),
        fresh_audio: outcome.audio,
    };
    let banner = if outcome.translation_failed {
        Banner {
            notice: None,
            warning: Some("Translation service failed; the phrase was stored as \"Error\"".into()),
        }
    } else {
        Banner {
            notice: Some(format!(
                "Saved {} / {} / {}",
                outcome.entry.japanese, outcome.entry.english, outcome.entry.german
            )),
            warning: None,
        }
    };
    Ok(Html(render_page(&content, &banner)).into_response())
}

pub(crate) async fn delete_phrase(
    State(books): State<Arc<Pocketbook>>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    let removed = books.phrases.delete(form.id).await?;
    let warning = removed.then(|| "Phrase deleted".to_string());
    Ok(back_to(Tab::Phrases, None, warning))
}

pub(crate) async fn phrase_audio(
    State(books): State<Arc<Pocketbook>>,
    Path((id, language)): Path<(i64, String)>,
) -> Result<Response, AppError> {
    let language: Language = language.parse()?;
    let clip = books
        .phrases
        .speak(id, language)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("audio for phrase {id}")))?;
    Ok(([(header::CONTENT_TYPE, clip.content_type)], clip.bytes).into_response())
}

pub(crate) async fn vocabulary_csv(
    State(books): State<Arc<Pocketbook>>,
) -> Result<Response, AppError> {
    let rows = books.vocabulary.list(None).await?;
    let mut buffer = Vec::new();
    write_csv(&mut buffer, &rows)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"vocabulary.csv\"",
            ),
        ],
        buffer,
    )
        .into_response())
}

fn back_to(tab: Tab, notice: Option<String>, warning: Option<String>) -> Redirect {
    let mut location = format!("/?tab={}", tab.slug());
    if let Some(notice) = notice {
        location.push_str("&notice=");
        location.push_str(&urlencoding::encode(&notice));
    }
    if let Some(warning) = warning {
        location.push_str("&warning=");
        location.push_str(&urlencoding::encode(&warning));
    }
    Redirect::to(&location)
}
