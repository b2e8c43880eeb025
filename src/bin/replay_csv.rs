use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use temblor::config::default_watch_specs;
use temblor::csv_loader::load_samples_from_csv;
use temblor::{MotionEventManager, TriggerState};

struct ReplayOptions {
    dump_deltas: bool,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    let mut dump_deltas = false;
    let mut csv_path: Option<PathBuf> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--deltas" => dump_deltas = true,
            _ => {
                if csv_path.is_some() {
                    bail!("Uso: replay_csv [--deltas] <muestras.csv>");
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV"))?;
    Ok((csv_path, ReplayOptions { dump_deltas }))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (csv_path, opts) = parse_args()?;
    println!("🎞️  Reproduciendo muestras desde {:?}", csv_path);

    let samples = load_samples_from_csv(&csv_path)?;
    let manager = MotionEventManager::new();

    let mut watched = Vec::new();
    for watch in default_watch_specs() {
        let id = manager.create_event(watch.motion())?;
        watched.push((watch.name, id, 0usize));
    }

    for (idx, sample) in samples.iter().enumerate() {
        manager.submit_sample(*sample)?;

        for (name, id, hits) in watched.iter_mut() {
            let event = manager
                .lookup(*id)
                .ok_or_else(|| anyhow!("El evento {} desapareció", id))?;
            if event.state() == TriggerState::Triggered {
                *hits += 1;
                println!("  {:>5}: {} ({:?})", idx, name, sample);
            }
        }
    }

    println!("\nResumen ({} muestras):", samples.len());
    for (name, id, hits) in &watched {
        println!("  {:<20} evento {:>3}: {:>5} muestras disparadas", name, id.0, hits);
    }

    if opts.dump_deltas {
        let deltas = manager.current_deltas();
        println!("\n📊 {} deltas de la última ventana:", deltas.len());
        for (idx, d) in deltas.iter().enumerate() {
            println!(
                "  {:02}: x={:>6} y={:>6} z={:>6} {}",
                idx,
                d.dlt_x,
                d.dlt_y,
                d.dlt_z,
                if d.noise { "movimiento" } else { "ruido" }
            );
        }
    }

    for (_, id, _) in &watched {
        manager.destroy_event(*id)?;
    }

    Ok(())
}
