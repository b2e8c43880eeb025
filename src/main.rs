/*
Daemon de eventos de movimiento

1. Lee muestras del acelerómetro (CSV x,y,z o binario de registros de 12 bytes)
2. Las publica como referencia y las envía al motor a ritmo constante
3. Registra los patrones configurados y lanza un hilo vigilante por cada uno
4. Pasado terminate_delay_secs destruye todos los eventos

Uso:
     ./target/release/temblor [--config temblor.json] [--specs patrones.bin] [--raw] muestras.csv

--specs sustituye los eventos configurados por registros de 16 bytes.

Sin fichero de muestras genera una secuencia sintética de sacudidas.
Nivel de log con RUST_LOG (por defecto info).
*/

use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::{after, bounded, select, unbounded, Sender};
use log::{error, info, warn};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use temblor::config::DaemonConfig;
use temblor::csv_loader::{load_samples_from_csv, load_samples_from_raw};
use temblor::{Credentials, EventError, EventId, MotionEventManager, Sample, WaitOutcome, WINDOW};

struct DaemonOptions {
    config_path: Option<PathBuf>,
    specs_path: Option<PathBuf>,
    raw: bool,
    samples_path: Option<PathBuf>,
}

/// Mensajes de los hilos vigilantes al hilo principal
enum WatchReport {
    Detected { name: String, id: EventId },
    Finished { name: String, id: EventId },
}

fn parse_args() -> Result<DaemonOptions> {
    let mut config_path = None;
    let mut specs_path = None;
    let mut raw = false;
    let mut samples_path = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config necesita una ruta"))?;
                config_path = Some(PathBuf::from(path));
            }
            "--specs" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--specs necesita una ruta"))?;
                specs_path = Some(PathBuf::from(path));
            }
            "--raw" => raw = true,
            _ => {
                if samples_path.is_some() {
                    bail!("Uso: temblor [--config FICHERO] [--specs FICHERO] [--raw] [muestras]");
                }
                samples_path = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(DaemonOptions {
        config_path,
        specs_path,
        raw,
        samples_path,
    })
}

/// Reposo, sacudida horizontal, reposo, vertical, reposo, combinada
fn synthetic_stream() -> Vec<Sample> {
    let rest = |n: usize| vec![Sample::new(0, 0, 981); n];
    let shake = |n: usize, x: i32, y: i32| -> Vec<Sample> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Sample::new(0, 0, 981)
                } else {
                    Sample::new(x, y, 981)
                }
            })
            .collect()
    };

    let mut samples = Vec::new();
    samples.extend(rest(WINDOW + 1));
    samples.extend(shake(WINDOW + 1, 450, 0));
    samples.extend(rest(WINDOW + 1));
    samples.extend(shake(WINDOW + 1, 0, 450));
    samples.extend(rest(WINDOW + 1));
    samples.extend(shake(WINDOW + 1, 450, 450));
    samples.extend(rest(WINDOW + 1));
    samples
}

fn spawn_watcher(
    manager: Arc<MotionEventManager>,
    name: String,
    id: EventId,
    tx: Sender<WatchReport>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            match manager.wait_event(id) {
                Ok(WaitOutcome::Triggered) => {
                    let _ = tx.send(WatchReport::Detected {
                        name: name.clone(),
                        id,
                    });
                    // El evento sigue disparado mientras la ventana coincida;
                    // la pausa limita los avisos repetidos
                    thread::sleep(Duration::from_millis(50));
                }
                Ok(WaitOutcome::Interrupted) => continue,
                Ok(WaitOutcome::Retired) | Err(EventError::NotFound(_)) => break,
                Err(e) => {
                    error!("❌ Error esperando el evento {}: {}", id, e);
                    break;
                }
            }
        }
        let _ = tx.send(WatchReport::Finished { name, id });
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = parse_args()?;
    let mut config = match &opts.config_path {
        Some(path) => DaemonConfig::load(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(path) = &opts.specs_path {
        config.load_raw_events(path)?;
        info!("📥 {} patrones cargados de {:?}", config.events.len(), path);
    }

    let samples = match &opts.samples_path {
        Some(path) if opts.raw => load_samples_from_raw(path)?,
        Some(path) => load_samples_from_csv(path)?,
        None => {
            info!("🔧 Sin fichero de muestras: usando secuencia sintética");
            synthetic_stream()
        }
    };
    info!("📥 {} muestras cargadas", samples.len());

    let manager = Arc::new(MotionEventManager::new());

    // Registrar eventos y lanzar vigilantes
    let (tx_report, rx_report) = unbounded::<WatchReport>();
    let mut watchers = Vec::new();
    let mut ids = Vec::new();
    for watch in &config.events {
        let id = manager
            .create_event(watch.motion())
            .with_context(|| format!("No se pudo crear el evento {:?}", watch.name))?;
        info!("🎯 Evento {} registrado para {}", id, watch.name);
        ids.push(id);
        watchers.push(spawn_watcher(
            Arc::clone(&manager),
            watch.name.clone(),
            id,
            tx_report.clone(),
        ));
    }
    drop(tx_report);

    // Canal de muestras: lector -> productor
    let (tx_sample, rx_sample) = bounded::<Sample>(100);
    let interval = Duration::from_millis(config.sample_interval_ms);
    thread::spawn(move || {
        for sample in samples {
            if tx_sample.send(sample).is_err() {
                break;
            }
            thread::sleep(interval);
        }
    });

    {
        let manager = Arc::clone(&manager);
        let caller = Credentials::user(config.caller_uid);
        thread::spawn(move || {
            let mut reference_denied = false;
            while let Ok(sample) = rx_sample.recv() {
                if let Err(e) = manager.set_reference(&caller, sample) {
                    if !reference_denied {
                        warn!("⚠️  No se pudo publicar la referencia: {}", e);
                        reference_denied = true;
                    }
                }
                if let Err(e) = manager.submit_sample(sample) {
                    error!("❌ Error enviando muestra: {}", e);
                }
            }
        });
    }

    info!(
        "🎬 Vigilando {} eventos durante {} s...",
        ids.len(),
        config.terminate_delay_secs
    );

    let deadline = after(Duration::from_secs(config.terminate_delay_secs));
    let mut finished = 0usize;
    loop {
        select! {
            recv(rx_report) -> msg => match msg {
                Ok(WatchReport::Detected { name, id }) => {
                    println!("[EVENTO {}] detectada {}", id, name);
                }
                Ok(WatchReport::Finished { name, id }) => {
                    info!("Vigilante de {} ({}) terminado", name, id);
                    finished += 1;
                }
                Err(_) => break,
            },
            recv(deadline) -> _ => break,
        }
    }

    for id in &ids {
        info!("🧹 Destruyendo evento {}", id);
        match manager.destroy_event(*id) {
            Ok(outcome) => info!("Evento {} destruido: {:?}", id, outcome),
            Err(e) => warn!("⚠️  {}", e),
        }
    }

    // Los vigilantes ven Retired y salen
    while finished < watchers.len() {
        match rx_report.recv() {
            Ok(WatchReport::Finished { .. }) => finished += 1,
            Ok(WatchReport::Detected { .. }) => {}
            Err(_) => break,
        }
    }
    for watcher in watchers {
        let _ = watcher.join();
    }

    info!("✅ Daemon terminado");
    Ok(())
}
