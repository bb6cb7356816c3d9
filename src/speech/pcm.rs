//! Float samples to 16-bit PCM.

/// Encode `samples` as little-endian signed 16-bit PCM.
///
/// Samples are clamped to [-1, 1]; negative values scale by 0x8000 and
/// positive values by 0x7FFF so both ends map onto the full i16 range.
pub fn pcm_encode(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
        let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
        out.extend_from_slice(&(scaled as i16).to_le_bytes());
    }
    out
}

/// Decode raw little-endian f32 bytes, as written by the recorder.
///
/// Trailing bytes that do not form a whole sample are returned in `rest`.
pub fn f32_le_samples(bytes: &[u8]) -> (Vec<f32>, &[u8]) {
    let whole = bytes.len() / 4 * 4;
    let samples = bytes[..whole]
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    (samples, &bytes[whole..])
}
