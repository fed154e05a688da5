//! JSON Lines match transcripts.
//!
//! A transcript holds one `meta` record, one `tick` record per tick played
//! and a closing `outcome` record. Each record is a single JSON object on
//! its own line, tagged by a `type` field.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::arena::{MatchReport, TickRecord};
use crate::config::ArenaConfig;
use crate::error::ConfigError;
use crate::game::{RobotId, World};
use crate::scenario::Scenario;

/// A participant as listed in the `meta` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Robot identifier.
    pub id: RobotId,
    /// Display name.
    pub name: String,
}

/// Header written before the first tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// Scenario name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Match seed.
    pub seed: u64,
    /// Rules in force.
    pub config: ArenaConfig,
    /// Robots in id order.
    pub robots: Vec<Participant>,
}

/// One line of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptRecord {
    /// Match header.
    Meta(MetaRecord),
    /// One tick.
    Tick(TickRecord),
    /// Final report.
    Outcome(MatchReport),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RecordRef<'a> {
    Meta(&'a MetaRecord),
    Tick(&'a TickRecord),
    Outcome(&'a MatchReport),
}

/// Streams transcript records to a writer.
#[derive(Debug)]
pub struct TranscriptWriter<W: Write> {
    out: W,
    ticks: u32,
}

impl<W: Write> TranscriptWriter<W> {
    /// Wrap a writer.
    pub const fn new(out: W) -> Self {
        Self { out, ticks: 0 }
    }

    /// Ticks written so far.
    #[must_use]
    pub const fn ticks_written(&self) -> u32 {
        self.ticks
    }

    /// Write the header.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_meta(&mut self, scenario: &Scenario, world: &World) -> std::io::Result<()> {
        let meta = MetaRecord {
            name: scenario.name.clone(),
            seed: scenario.seed,
            config: world.config,
            robots: world
                .robots
                .iter()
                .map(|r| Participant {
                    id: r.id,
                    name: r.name.clone(),
                })
                .collect(),
        };
        self.write_line(&RecordRef::Meta(&meta))
    }

    /// Write one tick.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_tick(&mut self, record: &TickRecord) -> std::io::Result<()> {
        self.ticks += 1;
        self.write_line(&RecordRef::Tick(record))
    }

    /// Write the final report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_outcome(&mut self, report: &MatchReport) -> std::io::Result<()> {
        self.write_line(&RecordRef::Outcome(report))
    }

    /// Flush the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, record: &RecordRef<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")
    }
}

/// Read every record of a transcript.
///
/// # Errors
///
/// Returns an error if a line cannot be read or parsed.
pub fn read_transcript<R: BufRead>(input: R) -> Result<Vec<TranscriptRecord>, ConfigError> {
    let mut records = Vec::new();
    for line in input.lines() {
        let line = line.map_err(|error| ConfigError::Io {
            path: "<transcript>".into(),
            error,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Outcome, RobotReport, WarningRecord};
    use crate::geometry::Vec2;

    fn report() -> MatchReport {
        MatchReport {
            name: Some("t".into()),
            outcome: Outcome::Winner(2),
            ticks: 3,
            seed: 1,
            robots: vec![RobotReport {
                id: 2,
                name: "b".into(),
                health: 40,
                alive: true,
                position: Vec2::new(1.0, 2.0),
                heading: 90.0,
                tosses: 1,
                hits_landed: 1,
                damage_taken: 60,
                faults: 0,
                forfeited: false,
            }],
        }
    }

    #[test]
    fn test_outcome_line_is_tagged() {
        let mut writer = TranscriptWriter::new(Vec::new());
        writer.write_outcome(&report()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["type"], "outcome");
        assert_eq!(value["outcome"]["winner"], 2);
    }

    #[test]
    fn test_read_back() {
        let mut writer = TranscriptWriter::new(Vec::new());
        writer.write_outcome(&report()).unwrap();
        let bytes = writer.into_inner();
        let records = read_transcript(bytes.as_slice()).unwrap();
        assert_eq!(records, vec![TranscriptRecord::Outcome(report())]);
    }

    #[test]
    fn test_tick_warnings_written() {
        let tick = TickRecord {
            tick: 4,
            robots: Vec::new(),
            commands: Vec::new(),
            faults: Vec::new(),
            warnings: vec![WarningRecord {
                id: 1,
                api: "move".into(),
                warning: "missing argument".into(),
                args: Vec::new(),
            }],
            tosses: Vec::new(),
            deaths: Vec::new(),
            forfeits: Vec::new(),
        };
        let mut writer = TranscriptWriter::new(Vec::new());
        writer.write_tick(&tick).unwrap();
        let bytes = writer.into_inner();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["type"], "tick");
        assert_eq!(value["warnings"][0]["api"], "move");
        assert!(value["warnings"][0].get("args").is_none());

        let records = read_transcript(bytes.as_slice()).unwrap();
        assert_eq!(records, vec![TranscriptRecord::Tick(tick)]);
    }

    #[test]
    fn test_garbage_line_is_error() {
        assert!(read_transcript("{\"type\":\"nope\"}\n".as_bytes()).is_err());
    }
}
