use std::env;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::fake_pbp;
use crate::pbp_fetch;

pub const EPA_FLOOR: f64 = -5.0;
pub const EPA_CEILING: f64 = 5.0;
pub const YARDLINE_CUTOFF: u8 = 75;

static DATASET: OnceCell<Vec<PlayRow>> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCall {
    Pass,
    Run,
    Punt,
    FieldGoal,
}

impl PlayCall {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pass" => Some(Self::Pass),
            "run" => Some(Self::Run),
            "punt" => Some(Self::Punt),
            "field_goal" => Some(Self::FieldGoal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Run => "run",
            Self::Punt => "punt",
            Self::FieldGoal => "field_goal",
        }
    }

    pub fn is_go(self) -> bool {
        matches!(self, Self::Pass | Self::Run)
    }
}

/// One admitted 4th-down play, downcast to the narrowest types that still
/// hold the source values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayRow {
    pub call: PlayCall,
    pub epa: f32,
    pub yardline_100: u8,
    pub ydstogo: u8,
    pub converted: bool,
    pub failed: bool,
    pub fg_made: bool,
}

/// Column values as they come off a source row, before admission. Both the
/// snapshot reader and the season fetch produce these.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawPlay {
    pub down: Option<f64>,
    pub play_type: Option<String>,
    pub epa: Option<f64>,
    pub yardline_100: Option<f64>,
    pub ydstogo: Option<f64>,
    pub converted: Option<f64>,
    pub failed: Option<f64>,
    pub field_goal_result: Option<String>,
}

/// Admission filter: 4th down, EPA present and bounded, inside the analyzed
/// field range, and a play call the model understands.
pub(crate) fn admit(raw: RawPlay) -> Option<PlayRow> {
    if raw.down? as i64 != 4 {
        return None;
    }
    let epa = raw.epa?;
    if !(EPA_FLOOR..=EPA_CEILING).contains(&epa) {
        return None;
    }
    let yardline = raw.yardline_100?;
    if !(0.0..=f64::from(YARDLINE_CUTOFF)).contains(&yardline) {
        return None;
    }
    let ydstogo = raw.ydstogo?;
    if !(0.0..=99.0).contains(&ydstogo) {
        return None;
    }
    let call = PlayCall::parse(raw.play_type.as_deref()?.trim())?;

    Some(PlayRow {
        call,
        epa: epa as f32,
        yardline_100: yardline as u8,
        ydstogo: ydstogo as u8,
        converted: raw.converted.unwrap_or(0.0) != 0.0,
        failed: raw.failed.unwrap_or(0.0) != 0.0,
        fg_made: raw.field_goal_result.as_deref().map(str::trim) == Some("made"),
    })
}

/// The analysis dataset, loaded at most once per process and shared by every
/// query afterwards.
pub fn analysis_dataset() -> Result<&'static [PlayRow]> {
    DATASET
        .get_or_try_init(load_dataset)
        .map(|rows| rows.as_slice())
}

fn load_dataset() -> Result<Vec<PlayRow>> {
    if demo_mode() {
        return Ok(fake_pbp::synthetic_dataset(fake_pbp::DEFAULT_SEED));
    }

    let path = snapshot_path();
    match read_snapshot(&path) {
        Ok(rows) => Ok(rows),
        Err(snapshot_err) => {
            eprintln!(
                "snapshot {} unavailable, fetching seasons from nflverse (this can take a while)",
                path.display()
            );
            pbp_fetch::fetch_seasons(&pbp_fetch::season_years()).with_context(|| {
                format!(
                    "no usable snapshot at {} ({snapshot_err:#}) and the remote fetch failed",
                    path.display()
                )
            })
        }
    }
}

pub fn snapshot_path() -> PathBuf {
    env::var("PBP_SNAPSHOT")
        .ok()
        .filter(|val| !val.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("pbp.csv"))
}

fn demo_mode() -> bool {
    env::var("FOURTH_DOWN_DEMO")
        .is_ok_and(|val| val == "1" || val.eq_ignore_ascii_case("true"))
}

/// Snapshot columns the loader reads; everything else in a row is ignored.
/// Fields stay `String` so the ""/NA missing-value markers survive until the
/// NA-aware parse below.
#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    #[serde(default)]
    down: String,
    #[serde(default)]
    play_type: String,
    #[serde(default)]
    epa: String,
    #[serde(default)]
    yardline_100: String,
    #[serde(default)]
    ydstogo: String,
    #[serde(default)]
    fourth_down_converted: String,
    #[serde(default)]
    fourth_down_failed: String,
    #[serde(default)]
    field_goal_result: String,
}

pub fn read_snapshot(path: &Path) -> Result<Vec<PlayRow>> {
    let file =
        File::open(path).with_context(|| format!("open snapshot {}", path.display()))?;
    parse_snapshot(file)
}

pub fn parse_snapshot<R: io::Read>(reader: R) -> Result<Vec<PlayRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for record in rdr.deserialize::<SnapshotRecord>() {
        let record = record.context("malformed snapshot row")?;
        let raw = RawPlay {
            down: na_f64(&record.down),
            play_type: na_str(&record.play_type).map(str::to_string),
            epa: na_f64(&record.epa),
            yardline_100: na_f64(&record.yardline_100),
            ydstogo: na_f64(&record.ydstogo),
            converted: na_f64(&record.fourth_down_converted),
            failed: na_f64(&record.fourth_down_failed),
            field_goal_result: na_str(&record.field_goal_result).map(str::to_string),
        };
        if let Some(play) = admit(raw) {
            out.push(play);
        }
    }
    Ok(out)
}

/// Writes a snapshot the loader can read back: leading index column, NA for
/// missing values. Used by the ingest binary only; the interactive tool never
/// writes.
pub fn write_snapshot(path: &Path, plays: &[PlayRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("create snapshot {}", path.display()))?;
    wtr.write_record([
        "",
        "down",
        "play_type",
        "epa",
        "yardline_100",
        "ydstogo",
        "fourth_down_converted",
        "fourth_down_failed",
        "field_goal_result",
    ])
    .context("write snapshot header")?;

    for (idx, play) in plays.iter().enumerate() {
        let fg_result = match play.call {
            PlayCall::FieldGoal if play.fg_made => "made",
            PlayCall::FieldGoal => "missed",
            _ => "NA",
        };
        wtr.write_record([
            idx.to_string(),
            "4".to_string(),
            play.call.as_str().to_string(),
            format!("{}", play.epa),
            play.yardline_100.to_string(),
            play.ydstogo.to_string(),
            u8::from(play.converted).to_string(),
            u8::from(play.failed).to_string(),
            fg_result.to_string(),
        ])
        .context("write snapshot row")?;
    }
    wtr.flush().context("flush snapshot")?;
    Ok(())
}

fn na_str(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "NA" {
        None
    } else {
        Some(trimmed)
    }
}

fn na_f64(raw: &str) -> Option<f64> {
    na_str(raw)?.parse::<f64>().ok()
}
