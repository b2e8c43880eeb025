use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use csv::ReaderBuilder;

use crate::codec;
use crate::types::Sample;

/// Carga una secuencia de muestras desde un CSV con encabezado x,y,z
pub fn load_samples_from_csv(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut samples = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;
        if record.len() < 3 {
            bail!("La fila {} no tiene 3 columnas", row_idx + 1);
        }

        let x: i32 = record[0]
            .parse()
            .with_context(|| format!("x inválido en fila {}", row_idx + 1))?;
        let y: i32 = record[1]
            .parse()
            .with_context(|| format!("y inválido en fila {}", row_idx + 1))?;
        let z: i32 = record[2]
            .parse()
            .with_context(|| format!("z inválido en fila {}", row_idx + 1))?;

        samples.push(Sample::new(x, y, z));
    }

    ensure!(!samples.is_empty(), "El CSV {:?} no contiene datos", path);
    Ok(samples)
}

/// Carga un fichero binario de registros de 12 bytes (x, y, z little-endian)
pub fn load_samples_from_raw(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("No se pudo leer {:?}", path))?;
    let samples = codec::decode_samples(&bytes)
        .with_context(|| format!("Fichero de muestras corrupto {:?}", path))?;
    ensure!(!samples.is_empty(), "El fichero {:?} no contiene muestras", path);
    Ok(samples)
}
