use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use fragscan_core::{
    FlagEvent, FragMessage, Fragfile, FragfileLoader, Matcher, RecordKind, decode_line,
};
use fragscan_types::{LoadPolicy, ScanConfig};
use rayon::prelude::*;
use serde::Serialize;

/// One recognized message
#[derive(Debug, Serialize)]
#[serde(tag = "hit", rename_all = "snake_case")]
enum Hit<'a> {
    Frag {
        line: usize,
        #[serde(flatten)]
        message: FragMessage,
        #[serde(skip_serializing_if = "Option::is_none")]
        weapon_name: Option<&'a str>,
    },
    Flag {
        line: usize,
        #[serde(flatten)]
        event: FlagEvent,
    },
}

fn load(path: &Path, policy: LoadPolicy) -> Result<Fragfile> {
    let loader = FragfileLoader::new(policy);
    tracing::debug!(path = %path.display(), policy = ?loader.policy(), "Loading fragfile");

    loader.load_file(path).map_err(|err| {
        let location = match err.line() {
            Some(line) => format!("{}:{line}", path.display()),
            None => path.display().to_string(),
        };
        anyhow::Error::new(err).context(format!("failed to load fragfile {location}"))
    })
}

pub fn check(path: &Path, policy: LoadPolicy) -> Result<()> {
    let fragfile = load(path, policy)?;
    let mut out = io::stdout().lock();

    writeln!(out, "{}", path.display())?;
    for (key, value) in fragfile.info() {
        writeln!(out, "  #FRAGFILE {key} = {value}")?;
    }
    for (key, value) in fragfile.meta() {
        writeln!(out, "  #META {key} = {value}")?;
    }

    for kind in RecordKind::ALL {
        let (count, keys): (usize, Vec<&str>) = match kind {
            RecordKind::WeaponClass => {
                let group = fragfile.weapon_classes();
                (group.len(), group.keys().collect())
            }
            RecordKind::Obituary => {
                let group = fragfile.obituaries();
                (group.len(), group.keys().collect())
            }
            RecordKind::FlagAlert => {
                let group = fragfile.flag_alerts();
                (group.len(), group.keys().collect())
            }
        };
        writeln!(out, "  {kind}: {count} records [{}]", keys.join(", "))?;
    }

    if fragfile.skipped_lines() > 0 {
        writeln!(out, "  skipped lines: {}", fragfile.skipped_lines())?;
    }

    // Fail here rather than mid-scan
    let matcher = Matcher::new(&fragfile)?;
    writeln!(out, "  {} templates compiled", matcher.len())?;
    Ok(())
}

pub fn scan(
    path: &Path,
    input: Option<&Path>,
    policy: LoadPolicy,
    json: bool,
    flags: bool,
) -> Result<()> {
    let fragfile = load(path, policy)?;
    let matcher = Matcher::new(&fragfile)?;

    let messages = match input {
        Some(input) => {
            let file = File::open(input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            read_messages(BufReader::new(file))?
        }
        None => read_messages(io::stdin().lock())?,
    };

    let hits: Vec<Hit<'_>> = messages
        .par_iter()
        .enumerate()
        .filter_map(|(index, message)| {
            let line = index + 1;
            if let Some(frag) = matcher.parse_message(message) {
                let weapon_name = fragfile
                    .weapon_class(&frag.weapon)
                    .map(|wc| wc.display_name());
                return Some(Hit::Frag {
                    line,
                    message: frag,
                    weapon_name,
                });
            }
            if flags {
                return matcher
                    .parse_flag_alert(message)
                    .map(|event| Hit::Flag { line, event });
            }
            None
        })
        .collect();

    tracing::info!(messages = messages.len(), matched = hits.len(), "Scan complete");

    let mut out = io::stdout().lock();
    for hit in &hits {
        if json {
            serde_json::to_writer(&mut out, hit)?;
            writeln!(out)?;
        } else {
            write_hit(&mut out, hit)?;
        }
    }
    Ok(())
}

pub fn dump(path: &Path, policy: LoadPolicy) -> Result<()> {
    let fragfile = load(path, policy)?;
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &fragfile)?;
    writeln!(out)?;
    Ok(())
}

pub fn show_config(app_name: &str, config: &ScanConfig) -> Result<()> {
    let path = confy::get_configuration_file_path(app_name, None)?;
    let mut out = io::stdout().lock();
    writeln!(out, "config file: {}", path.display())?;
    serde_json::to_writer_pretty(&mut out, config)?;
    writeln!(out)?;
    Ok(())
}

fn write_hit(out: &mut impl Write, hit: &Hit<'_>) -> io::Result<()> {
    match hit {
        Hit::Frag {
            line,
            message,
            weapon_name,
        } => writeln!(
            out,
            "{line}: {} x={:?} y={:?} weapon={}",
            message.kind,
            message.x,
            message.y,
            weapon_name.unwrap_or(&message.weapon)
        ),
        Hit::Flag { line, event } => writeln!(
            out,
            "{line}: {} player={:?} detail={:?}",
            event.kind, event.player, event.detail
        ),
    }
}

/// Read newline separated messages, decoded like fragfile lines
fn read_messages(reader: impl BufRead) -> Result<Vec<String>> {
    reader
        .split(b'\n')
        .map(|line| {
            let line = line.context("failed to read messages")?;
            let line = line.strip_suffix(b"\r").unwrap_or(&line);
            Ok(decode_line(line).into_owned())
        })
        .collect()
}
