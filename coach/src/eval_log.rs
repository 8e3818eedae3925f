//! Append-only CSV log of evaluation matches.
//!
//! The header comes from [`EvaluationRow`] and is written only when the file
//! is created, so repeated runs accumulate rows under a single header.

use std::fs::OpenOptions;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use arena::MatchResult;
use serde::{Deserialize, Serialize};

/// One evaluation match, seen from the checkpoint's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub timestamp: u64,
    pub env_id: String,
    pub checkpoint: String,
    pub opponent: String,
    pub games: u32,
    pub simulations: u32,
    pub temperature: f32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: f64,
}

impl EvaluationRow {
    /// Build a row stamped with the current time. `win_rate` keeps four decimals.
    pub fn new(
        env_id: &str,
        checkpoint: &Path,
        opponent: &str,
        simulations: u32,
        temperature: f32,
        result: &MatchResult,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            timestamp,
            env_id: env_id.to_string(),
            checkpoint: checkpoint.display().to_string(),
            opponent: opponent.to_string(),
            games: result.games(),
            simulations,
            temperature,
            wins: result.wins_a,
            losses: result.wins_b,
            draws: result.draws,
            win_rate: (result.win_rate_a() * 10_000.0).round() / 10_000.0,
        }
    }
}

/// Append `row` to the log at `path`, creating the file and its parent
/// directories if needed.
pub fn append_row(path: &Path, row: &EvaluationRow) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    writer.serialize(row)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn result() -> MatchResult {
        MatchResult {
            wins_a: 3,
            wins_b: 1,
            draws: 0,
        }
    }

    #[test]
    fn test_row_from_match_result() {
        let checkpoint = Path::new("best.json");
        let row = EvaluationRow::new("othello", checkpoint, "random", 25, 0.0, &result());
        assert_eq!(row.games, 4);
        assert_eq!(row.wins, 3);
        assert_eq!(row.losses, 1);
        assert_eq!(row.win_rate, 0.75);
    }

    #[test]
    fn test_comma_in_checkpoint_path_survives() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("evaluations.csv");
        let checkpoint = Path::new("runs/a,b/best.json");
        let row = EvaluationRow::new("othello", checkpoint, "random", 25, 0.0, &result());

        append_row(&path, &row).unwrap();
        append_row(&path, &row).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header_len = reader.headers().unwrap().len();
        assert_eq!(header_len, 11);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.len(), header_len);
            assert_eq!(&record[2], "runs/a,b/best.json");
        }

        let rows: Vec<EvaluationRow> = csv::Reader::from_path(&path)
            .unwrap()
            .deserialize()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows, vec![row.clone(), row]);
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("evaluations.csv");
        let checkpoint = Path::new("best.json");
        let row = EvaluationRow::new("territory", checkpoint, "greedy", 4, 1.0, &result());
        for _ in 0..3 {
            append_row(&path, &row).unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("timestamp,env_id,checkpoint"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("timestamp")).count(), 1);
    }
}
