use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use parquet::file::reader::{ChunkReader, FileReader, SerializedFileReader};
use parquet::record::Field;
use parquet::schema::types::Type;
use rayon::prelude::*;
use reqwest::blocking::Client;

use crate::play_data::{PlayRow, RawPlay, admit};

const DEFAULT_RELEASE_BASE: &str =
    "https://github.com/nflverse/nflverse-data/releases/download/pbp";
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Columns pulled out of each season file; the projection keeps the decoder
/// from materializing the hundreds of others.
const COLUMNS: [&str; 8] = [
    "down",
    "play_type",
    "epa",
    "yardline_100",
    "ydstogo",
    "fourth_down_converted",
    "fourth_down_failed",
    "field_goal_result",
];

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .user_agent("fourth-down-terminal")
            .build()
            .context("failed to build http client")
    })
}

/// Seasons the loader pulls on a snapshot miss. 2020 is intentionally absent
/// from the range.
pub fn season_years() -> Vec<u16> {
    (1999..=2019).chain(2021..=2024).collect()
}

/// Downloads and decodes every season in `years`. Each season is attempted
/// exactly once; any failure aborts the whole fetch.
pub fn fetch_seasons(years: &[u16]) -> Result<Vec<PlayRow>> {
    let client = http_client()?;
    let per_season = years
        .par_iter()
        .map(|year| fetch_season(client, *year).with_context(|| format!("season {year}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(per_season.into_iter().flatten().collect())
}

fn fetch_season(client: &Client, year: u16) -> Result<Vec<PlayRow>> {
    let url = format!("{}/play_by_play_{year}.parquet", release_base());
    let resp = client
        .get(&url)
        .send()
        .with_context(|| format!("request {url} failed"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http {status} fetching {url}"));
    }
    let body = resp.bytes().context("failed reading body")?;
    let reader = SerializedFileReader::new(body).context("open parquet payload")?;
    decode_plays(&reader)
}

fn decode_plays<R: ChunkReader + 'static>(reader: &SerializedFileReader<R>) -> Result<Vec<PlayRow>> {
    let schema = reader.metadata().file_metadata().schema();
    let fields = schema
        .get_fields()
        .iter()
        .filter(|field| COLUMNS.contains(&field.name()))
        .cloned()
        .collect::<Vec<_>>();
    if fields.len() != COLUMNS.len() {
        return Err(anyhow!(
            "payload schema has {} of the {} expected play-by-play columns",
            fields.len(),
            COLUMNS.len()
        ));
    }
    let projection = Type::group_type_builder("play")
        .with_fields(fields)
        .build()
        .context("build column projection")?;

    let mut out = Vec::new();
    for row in reader
        .get_row_iter(Some(projection))
        .context("iterate parquet rows")?
    {
        let row = row.context("decode parquet row")?;
        let mut raw = RawPlay::default();
        for (name, field) in row.get_column_iter() {
            match name.as_str() {
                "down" => raw.down = field_f64(field),
                "play_type" => raw.play_type = field_str(field),
                "epa" => raw.epa = field_f64(field),
                "yardline_100" => raw.yardline_100 = field_f64(field),
                "ydstogo" => raw.ydstogo = field_f64(field),
                "fourth_down_converted" => raw.converted = field_f64(field),
                "fourth_down_failed" => raw.failed = field_f64(field),
                "field_goal_result" => raw.field_goal_result = field_str(field),
                _ => {}
            }
        }
        if let Some(play) = admit(raw) {
            out.push(play);
        }
    }
    Ok(out)
}

fn field_f64(field: &Field) -> Option<f64> {
    match field {
        Field::Double(val) => Some(*val),
        Field::Float(val) => Some(f64::from(*val)),
        Field::Int(val) => Some(f64::from(*val)),
        Field::Long(val) => Some(*val as f64),
        _ => None,
    }
}

fn field_str(field: &Field) -> Option<String> {
    match field {
        Field::Str(val) => Some(val.clone()),
        _ => None,
    }
}

fn release_base() -> String {
    env::var("PBP_RELEASE_BASE")
        .ok()
        .filter(|val| !val.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RELEASE_BASE.to_string())
}
