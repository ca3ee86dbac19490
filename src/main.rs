//! Small harness around the estimation engine: reads observed content from
//! stdin (one item per line), estimates its footprint, and prints the
//! running day totals on exit.
//!
//! Prefixed lines take special paths: `preview:<text>` runs the draft-intent
//! estimator without folding, `manual:<modality>:<units>` logs a manual
//! entry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use log::warn;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use ecotally::{
    export, models::modality_from_str, Database, Observation, ObservedContent, ReferenceLoader,
    Session, SettingsStore,
};

fn data_dir() -> PathBuf {
    std::env::var_os("ECOTALLY_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".ecotally"))
}

fn reference_path() -> PathBuf {
    std::env::var_os("ECOTALLY_REFERENCE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/energy_reference.json"))
}

async fn log_manual_line(session: &mut Session, args: &str) {
    let Some((modality, units)) = args.split_once(':') else {
        println!("manual entry format: manual:<modality>:<units>");
        return;
    };
    let parsed = modality_from_str(modality.trim())
        .and_then(|m| Ok((m, units.trim().parse::<f64>()?)));
    match parsed {
        Ok((modality, units)) => match session.log_manual(modality, units).await {
            Ok(entry) => {
                println!(
                    "manual {}: {:.3} Wh · {:.3} g CO2 · {:.3} mL water",
                    entry.record.modality.as_str(),
                    entry.record.energy_wh,
                    entry.record.co2_g,
                    entry.record.water_ml
                );
                if !entry.persisted {
                    warn!("record was not persisted; it will not survive a restart");
                }
            }
            Err(err) => println!("manual entry rejected: {err}"),
        },
        Err(err) => println!("manual entry rejected: {err}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let store = Database::new(data_dir.join("ecotally.sqlite3"))?;
    let settings = Arc::new(SettingsStore::new(data_dir.join("settings.json"))?);
    let loader = ReferenceLoader::new(reference_path());

    let mut session = Session::new(&loader, settings, store).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(draft) = line.strip_prefix("preview:") {
            match session.preview(draft) {
                Some(estimate) => println!(
                    "preview ({}): {:.3} Wh · {:.3} g CO2 · {:.3} mL water",
                    estimate.modality.as_str(),
                    estimate.impact.energy_wh,
                    estimate.impact.co2_g,
                    estimate.impact.water_ml
                ),
                None => println!("preview: impact unknown"),
            }
            continue;
        }
        if let Some(args) = line.strip_prefix("manual:") {
            log_manual_line(&mut session, args).await;
            continue;
        }

        let id = Uuid::new_v4().to_string();
        if !session.claim(&id) {
            continue;
        }
        let content = ObservedContent::from_text(id, line);
        match session.observe(&content).await? {
            Observation::Estimated { record, persisted } => {
                println!(
                    "{}: {:.3} Wh · {:.3} g CO2 · {:.3} mL water ({} tokens)",
                    record.modality.as_str(),
                    record.energy_wh,
                    record.co2_g,
                    record.water_ml,
                    record.tokens
                );
                if !persisted {
                    warn!("record was not persisted; it will not survive a restart");
                }
            }
            Observation::Unknown => println!("impact unknown (unsupported content)"),
            Observation::Skipped => {}
        }
    }

    println!("{}", export::to_csv(session.ledger().totals()));
    Ok(())
}
