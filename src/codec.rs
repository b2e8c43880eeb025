//! Registros binarios little-endian con los que un proceso cliente entrega
//! muestras y patrones. Las funciones `encode_*` son API pública para quien
//! genera esos ficheros; el daemon sólo decodifica.

use crate::error::{EventError, Result};
use crate::types::{MotionSpec, Sample};

/// Tamaño de un registro de muestra: x, y, z como i32 little-endian
pub const SAMPLE_RECORD_LEN: usize = 12;

/// Tamaño de un registro de patrón: dlt_x, dlt_y, dlt_z, freq como u32 little-endian
pub const SPEC_RECORD_LEN: usize = 16;

fn word(value: &[u8], offset: usize) -> [u8; 4] {
    [
        value[offset],
        value[offset + 1],
        value[offset + 2],
        value[offset + 3],
    ]
}

/// Decodifica una muestra cruda
pub fn decode_sample(value: &[u8]) -> Result<Sample> {
    if value.len() != SAMPLE_RECORD_LEN {
        return Err(EventError::InvalidArgument(format!(
            "muestra de {} bytes, se esperaban {}",
            value.len(),
            SAMPLE_RECORD_LEN
        )));
    }

    Ok(Sample {
        x: i32::from_le_bytes(word(value, 0)),
        y: i32::from_le_bytes(word(value, 4)),
        z: i32::from_le_bytes(word(value, 8)),
    })
}

pub fn encode_sample(sample: &Sample) -> [u8; SAMPLE_RECORD_LEN] {
    let mut out = [0u8; SAMPLE_RECORD_LEN];
    out[0..4].copy_from_slice(&sample.x.to_le_bytes());
    out[4..8].copy_from_slice(&sample.y.to_le_bytes());
    out[8..12].copy_from_slice(&sample.z.to_le_bytes());
    out
}

/// Decodifica un patrón de movimiento. freq no se limita aquí; lo hace create_event.
pub fn decode_spec(value: &[u8]) -> Result<MotionSpec> {
    if value.len() != SPEC_RECORD_LEN {
        return Err(EventError::InvalidArgument(format!(
            "patrón de {} bytes, se esperaban {}",
            value.len(),
            SPEC_RECORD_LEN
        )));
    }

    Ok(MotionSpec {
        dlt_x: u32::from_le_bytes(word(value, 0)),
        dlt_y: u32::from_le_bytes(word(value, 4)),
        dlt_z: u32::from_le_bytes(word(value, 8)),
        freq: u32::from_le_bytes(word(value, 12)),
    })
}

pub fn encode_spec(spec: &MotionSpec) -> [u8; SPEC_RECORD_LEN] {
    let mut out = [0u8; SPEC_RECORD_LEN];
    out[0..4].copy_from_slice(&spec.dlt_x.to_le_bytes());
    out[4..8].copy_from_slice(&spec.dlt_y.to_le_bytes());
    out[8..12].copy_from_slice(&spec.dlt_z.to_le_bytes());
    out[12..16].copy_from_slice(&spec.freq.to_le_bytes());
    out
}

/// Decodifica un flujo de muestras consecutivas
pub fn decode_samples(stream: &[u8]) -> Result<Vec<Sample>> {
    if stream.len() % SAMPLE_RECORD_LEN != 0 {
        return Err(EventError::InvalidArgument(format!(
            "flujo de {} bytes no es múltiplo de {}",
            stream.len(),
            SAMPLE_RECORD_LEN
        )));
    }
    stream
        .chunks_exact(SAMPLE_RECORD_LEN)
        .map(decode_sample)
        .collect()
}

/// Decodifica un flujo de patrones consecutivos
pub fn decode_specs(stream: &[u8]) -> Result<Vec<MotionSpec>> {
    if stream.len() % SPEC_RECORD_LEN != 0 {
        return Err(EventError::InvalidArgument(format!(
            "flujo de {} bytes no es múltiplo de {}",
            stream.len(),
            SPEC_RECORD_LEN
        )));
    }
    stream.chunks_exact(SPEC_RECORD_LEN).map(decode_spec).collect()
}
