//! Snapshot types for saving and restoring library state.
//!
//! A [`Snapshot`] is a plain description of every record and collection, with
//! collection members named by title. It is the bridge between a live
//! [`Library`](crate::Library) and its two persisted encodings: the line
//! oriented text format and JSON.
//!
//! Text grammar:
//!
//! ```text
//! <record_count>
//! <id> <medium> <rating> <title>        (record_count lines)
//! <collection_count>
//! <collection_name> <member_count>      (then member_count title lines,
//! <member_title>                         one block per collection)
//! ```

use crate::{error::Result, CollectionName, Error, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// Version of the JSON snapshot format.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// One record as it appears in saved data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecord {
    pub id: RecordId,
    pub medium: String,
    /// 0 for unrated; range-checked when the snapshot is loaded
    pub rating: i64,
    pub title: String,
}

/// One collection as it appears in saved data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCollection {
    pub name: CollectionName,
    /// Member titles
    pub members: Vec<String>,
}

/// A point-in-time description of a library.
///
/// Parsing only checks the grammar. Referential checks (unique titles and
/// IDs, members naming existing records) happen when the snapshot is loaded
/// into a fresh library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// JSON format version
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub records: Vec<SavedRecord>,
    pub collections: Vec<SavedCollection>,
}

fn default_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// The text encoding.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.records.len())?;
        for record in &self.records {
            writeln!(
                f,
                "{} {} {} {}",
                record.id, record.medium, record.rating, record.title
            )?;
        }
        writeln!(f, "{}", self.collections.len())?;
        for collection in &self.collections {
            writeln!(f, "{} {}", collection.name, collection.members.len())?;
            for title in &collection.members {
                writeln!(f, "{}", title)?;
            }
        }
        Ok(())
    }
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            records: Vec::new(),
            collections: Vec::new(),
        }
    }

    /// Count membership slots across all collections.
    pub fn membership_slots(&self) -> usize {
        self.collections.iter().map(|c| c.members.len()).sum()
    }

    /// Write the text encoding.
    pub fn write_text<W: Write>(&self, mut out: W) -> Result<()> {
        write!(out, "{}", self)?;
        out.flush()?;
        Ok(())
    }

    /// Text encoding as a string.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Read and parse the text encoding.
    pub fn read_text<R: Read>(mut input: R) -> Result<Self> {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .map_err(|e| Error::MalformedData(e.to_string()))?;
        Self::parse_text(&text)
    }

    /// Parse the text encoding.
    ///
    /// Anything after the last collection block is ignored.
    pub fn parse_text(text: &str) -> Result<Self> {
        let mut lines = TextLines::new(text);
        let mut snapshot = Snapshot::new();

        let record_count = lines.count("record count")?;
        for _ in 0..record_count {
            let (number, line) = lines.structural("record")?;
            snapshot.records.push(parse_record(number, line)?);
        }

        let collection_count = lines.count("collection count")?;
        for _ in 0..collection_count {
            let (number, line) = lines.structural("collection header")?;
            let (name, rest) = next_token(line)
                .ok_or_else(|| malformed(number, "missing collection name"))?;
            let (count, rest) =
                next_token(rest).ok_or_else(|| malformed(number, "missing member count"))?;
            if !rest.trim().is_empty() {
                return Err(malformed(number, "unexpected text after member count"));
            }
            let count: usize = count
                .parse()
                .map_err(|_| malformed(number, "member count is not a number"))?;

            let mut collection = SavedCollection {
                name: name.to_string(),
                members: Vec::with_capacity(count),
            };
            for _ in 0..count {
                let (number, line) = lines.any("member title")?;
                let title = line.trim();
                if title.is_empty() {
                    return Err(malformed(number, "empty member title"));
                }
                collection.members.push(title.to_string());
            }
            snapshot.collections.push(collection);
        }

        Ok(snapshot)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::MalformedData(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::MalformedData(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::MalformedData(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::MalformedData(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }
}

/// Summary of a snapshot without the full data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub format_version: u32,
    pub record_count: usize,
    pub collection_count: usize,
    pub membership_slots: usize,
    /// Highest record ID, which becomes the ID counter after a restore
    pub max_id: RecordId,
}

impl From<&Snapshot> for SnapshotMetadata {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            format_version: snapshot.format_version,
            record_count: snapshot.records.len(),
            collection_count: snapshot.collections.len(),
            membership_slots: snapshot.membership_slots(),
            max_id: snapshot.records.iter().map(|r| r.id).max().unwrap_or(0),
        }
    }
}

fn malformed(line: usize, what: &str) -> Error {
    Error::MalformedData(format!("line {}: {}", line, what))
}

/// Split off the first whitespace-delimited token.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn parse_record(number: usize, line: &str) -> Result<SavedRecord> {
    let (id, rest) = next_token(line).ok_or_else(|| malformed(number, "missing record id"))?;
    let (medium, rest) = next_token(rest).ok_or_else(|| malformed(number, "missing medium"))?;
    let (rating, rest) = next_token(rest).ok_or_else(|| malformed(number, "missing rating"))?;

    let id: RecordId = id
        .parse()
        .map_err(|_| malformed(number, "record id is not a number"))?;
    let rating: i64 = rating
        .parse()
        .map_err(|_| malformed(number, "rating is not a number"))?;
    let title = rest.trim();
    if title.is_empty() {
        return Err(malformed(number, "missing title"));
    }

    Ok(SavedRecord {
        id,
        medium: medium.to_string(),
        rating,
        title: title.to_string(),
    })
}

/// Line cursor that reports 1-based line numbers.
struct TextLines<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> TextLines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    /// Next line, whatever it holds.
    fn any(&mut self, what: &str) -> Result<(usize, &'a str)> {
        self.lines
            .next()
            .map(|(i, line)| (i + 1, line))
            .ok_or_else(|| Error::MalformedData(format!("unexpected end of data reading {}", what)))
    }

    /// Next non-blank line.
    fn structural(&mut self, what: &str) -> Result<(usize, &'a str)> {
        loop {
            let (number, line) = self.any(what)?;
            if !line.trim().is_empty() {
                return Ok((number, line));
            }
        }
    }

    fn count(&mut self, what: &str) -> Result<usize> {
        let (number, line) = self.structural(what)?;
        line.trim()
            .parse()
            .map_err(|_| malformed(number, &format!("{} is not a number", what)))
    }
}
