//! Server-rendered HTML for the tabbed page.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::books::{
    Candidate, ExchangeRateSample, PhraseEntry, VocabularyEntry, SKILL_CHOICES,
};
use crate::enrichment::{Language, RateQuote, SpeechClip};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem}\
nav a{margin-right:1rem;padding:.4rem .8rem;border-radius:6px;text-decoration:none}\
nav a.active{background:#1f6feb;color:#fff}\
table{border-collapse:collapse;width:100%;margin:1rem 0}\
th,td{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}\
form.inline{display:flex;gap:.5rem;flex-wrap:wrap;align-items:end}\
.notice{background:#e6ffed;padding:.6rem;border-radius:6px}\
.warning{background:#fff5b1;padding:.6rem;border-radius:6px}\
.info{color:#57606a}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Candidates,
    Rates,
    Vocabulary,
    Phrases,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Candidates, Tab::Rates, Tab::Vocabulary, Tab::Phrases];

    pub fn from_slug(slug: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.slug() == slug.trim())
    }

    pub fn slug(self) -> &'static str {
        match self {
            Tab::Candidates => "candidates",
            Tab::Rates => "rates",
            Tab::Vocabulary => "vocabulary",
            Tab::Phrases => "phrases",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Tab::Candidates => "Candidates",
            Tab::Rates => "EUR/MYR",
            Tab::Vocabulary => "Vocabulary",
            Tab::Phrases => "Phrase book",
        }
    }
}

/// One-shot messages shown above the active tab.
#[derive(Debug, Clone, Default)]
pub struct Banner {
    pub notice: Option<String>,
    pub warning: Option<String>,
}

/// Everything needed to render one tab.
#[derive(Debug)]
pub enum TabContent {
    Candidates {
        rows: Vec<Candidate>,
        total: usize,
        search: String,
    },
    Rates {
        current: RateQuote,
        history: Vec<ExchangeRateSample>,
    },
    Vocabulary {
        rows: Vec<VocabularyEntry>,
        total: usize,
        search: String,
    },
    Phrases {
        rows: Vec<PhraseEntry>,
        total: usize,
        search: String,
        fresh_audio: Option<SpeechClip>,
    },
}

impl TabContent {
    fn tab(&self) -> Tab {
        match self {
            TabContent::Candidates { .. } => Tab::Candidates,
            TabContent::Rates { .. } => Tab::Rates,
            TabContent::Vocabulary { .. } => Tab::Vocabulary,
            TabContent::Phrases { .. } => Tab::Phrases,
        }
    }
}

pub fn render_page(content: &TabContent, banner: &Banner) -> String {
    let active = content.tab();
    let mut html = String::from("<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Pocketbook</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body><h1>Pocketbook</h1><nav>");

    for tab in Tab::ALL {
        let class = if tab == active { " class=\"active\"" } else { "" };
        html.push_str(&format!(
            "<a href=\"/?tab={}\"{}>{}</a>",
            tab.slug(),
            class,
            tab.title()
        ));
    }
    html.push_str("</nav>");

    if let Some(notice) = &banner.notice {
        html.push_str(&format!("<p class=\"notice\">{}</p>", escape(notice)));
    }
    if let Some(warning) = &banner.warning {
        html.push_str(&format!("<p class=\"warning\">{}</p>", escape(warning)));
    }

    match content {
        TabContent::Candidates {
            rows,
            total,
            search,
        } => render_candidates(&mut html, rows, *total, search),
        TabContent::Rates { current, history } => render_rates(&mut html, current, history),
        TabContent::Vocabulary {
            rows,
            total,
            search,
        } => render_vocabulary(&mut html, rows, *total, search),
        TabContent::Phrases {
            rows,
            total,
            search,
            fresh_audio,
        } => render_phrases(&mut html, rows, *total, search, fresh_audio.as_ref()),
    }

    html.push_str("</body></html>");
    html
}

fn render_candidates(html: &mut String, rows: &[Candidate], total: usize, search: &str) {
    html.push_str("<h2>Register a candidate</h2>");
    html.push_str("<form class=\"inline\" method=\"post\" action=\"/candidates\">");
    html.push_str("<label>Name <input name=\"name\" required></label>");
    html.push_str(
        "<label>Skill <input name=\"skill\" list=\"skills\" required></label><datalist id=\"skills\">",
    );
    for skill in SKILL_CHOICES {
        html.push_str(&format!("<option value=\"{}\">", escape(skill)));
    }
    html.push_str("</datalist>");
    html.push_str("<label>Target country <input name=\"target_country\" required></label>");
    html.push_str("<button type=\"submit\">Register</button></form>");

    html.push_str("<h2>Registered candidates</h2>");
    if total == 0 {
        html.push_str("<p class=\"info\">No candidates yet.</p>");
        return;
    }
    render_search(html, Tab::Candidates, search);
    if rows.is_empty() {
        render_no_matches(html, search);
        return;
    }
    html.push_str(
        "<table><thead><tr><th>ID</th><th>Name</th><th>Skill</th><th>Target country</th><th>Registered</th></tr></thead><tbody>",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.id,
            escape(&row.name),
            escape(&row.skill),
            escape(&row.target_country),
            row.created_at.format("%Y-%m-%d %H:%M")
        ));
    }
    html.push_str("</tbody></table>");
}

fn render_rates(html: &mut String, current: &RateQuote, history: &[ExchangeRateSample]) {
    html.push_str(&format!(
        "<h2>{} now</h2><p><strong>{:.4}</strong></p>",
        escape(&current.pair()),
        current.rate
    ));
    if let Some(warning) = &current.warning {
        html.push_str(&format!("<p class=\"warning\">{}</p>", escape(warning)));
    }
    html.push_str("<form method=\"post\" action=\"/rates/record\"><button type=\"submit\">Record current rate</button></form>");

    html.push_str("<h2>History</h2>");
    if history.is_empty() {
        html.push_str("<p class=\"info\">Nothing recorded yet.</p>");
        return;
    }
    html.push_str("<table><thead><tr><th>Recorded</th><th>Pair</th><th>Rate</th></tr></thead><tbody>");
    for sample in history {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.4}</td></tr>",
            sample.recorded_at.format("%Y-%m-%d %H:%M"),
            escape(&sample.pair),
            sample.rate
        ));
    }
    html.push_str("</tbody></table>");
}

fn render_vocabulary(html: &mut String, rows: &[VocabularyEntry], total: usize, search: &str) {
    html.push_str("<h2>New word</h2>");
    html.push_str("<form class=\"inline\" method=\"post\" action=\"/vocabulary\">");
    html.push_str("<label>German <input name=\"german\" required></label>");
    html.push_str("<label>Japanese <input name=\"japanese\" required></label>");
    html.push_str("<label>Memo <input name=\"memo\"></label>");
    html.push_str("<button type=\"submit\">Save word</button></form>");

    html.push_str("<h2>Word list</h2>");
    if total == 0 {
        html.push_str("<p class=\"info\">No words yet. Add one with the form above.</p>");
        return;
    }
    render_search(html, Tab::Vocabulary, search);
    if rows.is_empty() {
        render_no_matches(html, search);
        return;
    }
    html.push_str(
        "<table><thead><tr><th>ID</th><th>German</th><th>Japanese</th><th>Memo</th><th>Added</th></tr></thead><tbody>",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.id,
            escape(&row.german),
            escape(&row.japanese),
            escape(&row.memo),
            row.created_at.format("%Y-%m-%d")
        ));
    }
    html.push_str("</tbody></table>");

    let options: Vec<(i64, String)> = rows.iter().map(|row| (row.id, row.label())).collect();
    render_delete(html, "/vocabulary/delete", &options);
    html.push_str("<p><a href=\"/vocabulary.csv\">Download CSV</a></p>");
}

fn render_phrases(
    html: &mut String,
    rows: &[PhraseEntry],
    total: usize,
    search: &str,
    fresh_audio: Option<&SpeechClip>,
) {
    html.push_str("<h2>New phrase</h2>");
    html.push_str("<form class=\"inline\" method=\"post\" action=\"/phrases\">");
    html.push_str("<label>Japanese <input name=\"japanese\" required></label>");
    html.push_str("<label>Memo <input name=\"memo\"></label>");
    html.push_str("<button type=\"submit\">Translate and save</button></form>");

    if let Some(clip) = fresh_audio {
        html.push_str(&format!(
            "<p>Listen ({}): <audio controls autoplay src=\"data:{};base64,{}\"></audio></p>",
            clip.language.label(),
            clip.content_type,
            STANDARD.encode(&clip.bytes)
        ));
    }

    html.push_str("<h2>Phrases</h2>");
    if total == 0 {
        html.push_str("<p class=\"info\">No phrases yet.</p>");
        return;
    }
    render_search(html, Tab::Phrases, search);
    if rows.is_empty() {
        render_no_matches(html, search);
        return;
    }
    html.push_str(
        "<table><thead><tr><th>ID</th><th>Japanese</th><th>English</th><th>German</th><th>Memo</th><th>Listen</th></tr></thead><tbody>",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td></tr>",
            row.id,
            escape(&row.japanese),
            escape(&row.english),
            escape(&row.german),
            escape(&row.memo),
            audio_player(row.id, Language::German),
            audio_player(row.id, Language::Japanese),
        ));
    }
    html.push_str("</tbody></table>");

    let options: Vec<(i64, String)> = rows.iter().map(|row| (row.id, row.label())).collect();
    render_delete(html, "/phrases/delete", &options);
}

fn audio_player(id: i64, language: Language) -> String {
    format!(
        "<audio controls preload=\"none\" title=\"{}\" src=\"/phrases/{}/audio/{}\"></audio>",
        language.label(),
        id,
        language.code()
    )
}

fn render_search(html: &mut String, tab: Tab, search: &str) {
    html.push_str(&format!(
        "<form method=\"get\" action=\"/\"><input type=\"hidden\" name=\"tab\" value=\"{}\"><input name=\"q\" value=\"{}\" placeholder=\"Search\"><button type=\"submit\">Search</button></form>",
        tab.slug(),
        escape(search)
    ));
}

fn render_no_matches(html: &mut String, search: &str) {
    html.push_str(&format!(
        "<p class=\"info\">No matches for \"{}\".</p>",
        escape(search)
    ));
}

fn render_delete(html: &mut String, action: &str, options: &[(i64, String)]) {
    if options.is_empty() {
        return;
    }
    html.push_str(&format!(
        "<form class=\"inline\" method=\"post\" action=\"{action}\"><select name=\"id\">"
    ));
    for (id, label) in options {
        html.push_str(&format!("<option value=\"{}\">{}</option>", id, escape(label)));
    }
    html.push_str("</select><button type=\"submit\">Delete selected</button></form>");
}

pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn word(id: i64, german: &str, japanese: &str) -> VocabularyEntry {
        VocabularyEntry {
            id,
            german: german.to_string(),
            japanese: japanese.to_string(),
            memo: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn delete_selector_is_keyed_by_identifier() {
        let content = TabContent::Vocabulary {
            rows: vec![word(5, "Guten Morgen", "おはよう")],
            total: 1,
            search: String::new(),
        };
        let html = render_page(&content, &Banner::default());
        assert!(html.contains("<option value=\"5\">Guten Morgen (おはよう)</option>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let content = TabContent::Vocabulary {
            rows: vec![word(1, "<script>", "x")],
            total: 1,
            search: "\"q\"".to_string(),
        };
        let html = render_page(&content, &Banner::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("value=\"&quot;q&quot;\""));
    }

    #[test]
    fn empty_books_show_an_info_message() {
        let content = TabContent::Vocabulary {
            rows: Vec::new(),
            total: 0,
            search: String::new(),
        };
        let html = render_page(&content, &Banner::default());
        assert!(html.contains("No words yet"));
        assert!(!html.contains("<select"));
    }

    #[test]
    fn searches_without_hits_say_so() {
        let content = TabContent::Vocabulary {
            rows: Vec::new(),
            total: 3,
            search: "zzz".to_string(),
        };
        let html = render_page(&content, &Banner::default());
        assert!(html.contains("<p class=\"info\">No matches for &quot;zzz&quot;.</p>"));
        assert!(!html.contains("<table>"));
        assert!(!html.contains("No words yet"));
    }

    #[test]
    fn tab_slugs_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_slug(tab.slug()), Some(tab));
        }
        assert_eq!(Tab::from_slug("bogus"), None);
    }

    #[test]
    fn banners_are_rendered() {
        let content = TabContent::Candidates {
            rows: Vec::new(),
            total: 0,
            search: String::new(),
        };
        let banner = Banner {
            notice: Some("Registered Aiko".into()),
            warning: Some("careful".into()),
        };
        let html = render_page(&content, &banner);
        assert!(html.contains("<p class=\"notice\">Registered Aiko</p>"));
        assert!(html.contains("<p class=\"warning\">careful</p>"));
        assert!(html.contains("<a href=\"/?tab=candidates\" class=\"active\">"));
    }
}
