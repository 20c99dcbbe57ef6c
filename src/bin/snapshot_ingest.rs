use std::path::PathBuf;

use anyhow::{Context, Result};

use fourth_down_terminal::{pbp_fetch, play_data};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let out_path = parse_out_path_arg().unwrap_or_else(play_data::snapshot_path);
    let years = pbp_fetch::season_years();

    println!("Fetching {} seasons of play-by-play data...", years.len());
    let plays = pbp_fetch::fetch_seasons(&years)?;
    play_data::write_snapshot(&out_path, &plays)
        .with_context(|| format!("write snapshot {}", out_path.display()))?;

    println!("Snapshot ingest complete");
    println!("File: {}", out_path.display());
    println!("Plays kept: {}", plays.len());
    Ok(())
}

fn parse_out_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if arg == "--out" {
            return args.get(idx + 1).map(PathBuf::from);
        }
        if let Some(rest) = arg.strip_prefix("--out=") {
            return Some(PathBuf::from(rest));
        }
    }
    None
}
