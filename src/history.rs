//! Session-scoped run history and its CSV serialization.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::PicstoryError;

const RECORDS_KEY: &str = "run_records";

/// One logged generation event: the inputs plus both generated texts.
/// Immutable once appended; lives only in the session store.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RunRecord {
    /// RFC 3339 UTC timestamp of the run.
    pub timestamp: String,
    /// Source filename of the uploaded image.
    pub filename: String,
    /// Tone selector as submitted (post-fallback).
    pub tone: String,
    /// Length selector as submitted (post-fallback).
    pub length: String,
    /// Content-type selector as submitted (post-fallback).
    pub content_type: String,
    /// The verbatim user prompt.
    pub prompt: String,
    /// The generated image description.
    pub image_description: String,
    /// The generated story or blog text.
    pub generated_text: String,
}

/// Returns the session's history in insertion order.
pub async fn records(session: &Session) -> Result<Vec<RunRecord>, PicstoryError> {
    Ok(session
        .get::<Vec<RunRecord>>(RECORDS_KEY)
        .await?
        .unwrap_or_default())
}

/// Appends one record to the session's history.
pub async fn append_record(session: &Session, record: RunRecord) -> Result<(), PicstoryError> {
    let mut current = records(session).await?;
    current.push(record);
    session.insert(RECORDS_KEY, current).await?;
    Ok(())
}

/// Empties the session's history.
pub async fn clear(session: &Session) -> Result<(), PicstoryError> {
    session.remove::<Vec<RunRecord>>(RECORDS_KEY).await?;
    Ok(())
}

/// Serializes the history as CSV, header row first, rows in history order.
pub fn to_csv(records: &[RunRecord]) -> String {
    let mut out = String::from(
        "timestamp,filename,tone,length,type,prompt,image_description,generated_text\n",
    );
    for record in records {
        let fields = [
            record.timestamp.as_str(),
            record.filename.as_str(),
            record.tone.as_str(),
            record.length.as_str(),
            record.content_type.as_str(),
            record.prompt.as_str(),
            record.image_description.as_str(),
            record.generated_text.as_str(),
        ];
        let row = fields.map(csv_field).join(",");
        out.push_str(&row);
        out.push('\n');
    }
    out
}

/// Quotes a field when it contains a delimiter, quote or line break,
/// doubling any embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> RunRecord {
        RunRecord {
            timestamp: "2026-08-29T12:00:00+00:00".to_string(),
            filename: "sunset.png".to_string(),
            tone: "Playful".to_string(),
            length: "Short".to_string(),
            content_type: "Story".to_string(),
            prompt: "Write about a sunset".to_string(),
            image_description: "An orange sky over water.".to_string(),
            generated_text: "The sun dipped, unhurried.".to_string(),
        }
    }

    /// Minimal CSV reader, enough to round-trip our own output.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();
        while let Some(ch) = chars.next() {
            if in_quotes {
                match ch {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    other => field.push(other),
                }
            } else {
                match ch {
                    '"' => in_quotes = true,
                    ',' => row.push(std::mem::take(&mut field)),
                    '\n' => {
                        row.push(std::mem::take(&mut field));
                        rows.push(std::mem::take(&mut row));
                    }
                    other => field.push(other),
                }
            }
        }
        rows
    }

    #[test]
    fn csv_round_trips_rows_and_fields() {
        let mut awkward = sample_record();
        awkward.prompt = "A \"quoted\" prompt, with commas\nand a newline".to_string();
        awkward.generated_text = "Line one.\r\nLine two.".to_string();
        let records = vec![sample_record(), awkward.clone()];

        let csv = to_csv(&records);
        let rows = parse_csv(&csv);

        assert_eq!(rows.len(), records.len() + 1);
        assert_eq!(rows[0][0], "timestamp");
        assert_eq!(rows[1][1], "sunset.png");
        assert_eq!(rows[2][5], awkward.prompt);
        assert_eq!(rows[2][7], awkward.generated_text);
    }

    #[test]
    fn csv_of_empty_history_is_just_the_header() {
        let csv = to_csv(&[]);
        assert_eq!(
            csv,
            "timestamp,filename,tone,length,type,prompt,image_description,generated_text\n"
        );
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("with,comma"), "\"with,comma\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
