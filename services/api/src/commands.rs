use clap::Args;
use pocketbook::books::{write_csv, ExchangeRateSample, Pocketbook, VocabularyEntry};
use pocketbook::config::AppConfig;
use pocketbook::enrichment::RateQuote;
use pocketbook::error::AppError;
use pocketbook::telemetry;
use std::io::Write;

#[derive(Args, Debug, Default)]
pub(crate) struct RateArgs {
    /// Append the fetched rate to the rate history
    #[arg(long)]
    pub(crate) record: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct VocabularyListArgs {
    /// Only show words whose fields contain this text (case-insensitive)
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Print CSV instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
}

async fn open_books() -> Result<Pocketbook, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    Pocketbook::connect(&config.storage, &config.enrichment).await
}

pub(crate) async fn run_rate(args: RateArgs) -> Result<(), AppError> {
    let books = open_books().await?;

    if !args.record {
        print!("{}", render_quote(&books.rates.current().await));
        return Ok(());
    }

    let recording = books.rates.record().await?;
    print!("{}", render_quote(&recording.quote));
    match recording.sample {
        Some(sample) => println!("{}", render_sample(&sample)),
        None => println!("Nothing recorded."),
    }
    Ok(())
}

pub(crate) async fn run_vocabulary_list(args: VocabularyListArgs) -> Result<(), AppError> {
    let books = open_books().await?;
    let rows = books.vocabulary.list(args.search.as_deref()).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.csv {
        write_csv(&mut out, &rows)?;
    } else {
        out.write_all(render_vocabulary(&rows).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn render_quote(quote: &RateQuote) -> String {
    let mut text = format!("{}: {:.4}\n", quote.pair(), quote.rate);
    if let Some(warning) = &quote.warning {
        text.push_str(&format!("warning: {warning}\n"));
    }
    text
}

fn render_sample(sample: &ExchangeRateSample) -> String {
    format!(
        "Recorded #{} {} {:.4} at {}",
        sample.id,
        sample.pair,
        sample.rate,
        sample.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn render_vocabulary(rows: &[VocabularyEntry]) -> String {
    if rows.is_empty() {
        return "No words stored.\n".to_string();
    }

    let mut text = String::new();
    for row in rows {
        text.push_str(&format!(
            "{:>4}  {}  {}",
            row.id,
            row.label(),
            row.created_at.format("%Y-%m-%d")
        ));
        if !row.memo.is_empty() {
            text.push_str(&format!("  [{}]", row.memo));
        }
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn unavailable_quote_prints_its_warning() {
        let quote = RateQuote::unavailable("EUR", "MYR", "exchange rate unavailable: timeout".into());
        let text = render_quote(&quote);
        assert!(text.starts_with("EUR/MYR: 0.0000\n"));
        assert!(text.contains("warning: exchange rate unavailable: timeout"));
    }

    #[test]
    fn vocabulary_lines_show_label_and_memo() {
        let rows = vec![VocabularyEntry {
            id: 7,
            german: "Haus".into(),
            japanese: "家".into(),
            memo: "das".into(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }];
        assert_eq!(render_vocabulary(&rows), "   7  Haus (家)  2025-01-02  [das]\n");
        assert_eq!(render_vocabulary(&[]), "No words stored.\n");
    }
}
