use anyhow::Result;
use serde_json::json;
use studycard_core::{Card, CardQuery, PendingAnswer, ViewKind};

use crate::OutputFormat;

const PREVIEW_CHARS: usize = 80;

pub fn answer(pending: &PendingAnswer, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = json!({
                "question": pending.question,
                "category": pending.category.label(),
                "answer": pending.answer.text,
                "placeholder": pending.answer.is_placeholder(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("[{}] {}", pending.category.label(), pending.question);
            if pending.answer.is_placeholder() {
                println!("(placeholder answer: no credential configured)");
            }
            println!();
            println!("{}", pending.answer.text);
        }
    }
    Ok(())
}

pub fn saved(card: &Card, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(card)?),
        OutputFormat::Plain => println!("\nsaved {} to {}", card.id, card.category.label()),
    }
    Ok(())
}

pub fn cards(view: ViewKind, query: &CardQuery, cards: &[Card], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(cards)?),
        OutputFormat::Plain => {
            if cards.is_empty() {
                if query.is_filtered() {
                    println!("no cards in {} match \"{}\"", view.label(), query.text);
                } else {
                    println!("no cards in {}", view.label());
                }
                return Ok(());
            }
            println!("{} ({} cards)", view.label(), cards.len());
            for card in cards {
                let star = if card.starred { "*" } else { " " };
                println!("{star} {}  {}  {}", card.id, card.timestamp, card.question);
                println!("    {}", preview(&card.answer));
            }
        }
    }
    Ok(())
}

pub fn counts(counts: &[(ViewKind, usize)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output: Vec<_> = counts
                .iter()
                .map(|(view, count)| {
                    json!({
                        "view": view.slug(),
                        "label": view.label(),
                        "count": count,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for (view, count) in counts {
                println!("{:<12} {:>4}  {}", view.slug(), count, view.label());
            }
        }
    }
    Ok(())
}

pub fn done(action: &str, id: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", json!({ "id": id, "action": action })),
        OutputFormat::Plain => println!("{action} {id}"),
    }
    Ok(())
}

/// First line of `text`, capped at [`PREVIEW_CHARS`].
fn preview(text: &str) -> String {
    let line = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    let mut out: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
