use crate::types::{Delta, MotionSpec, Sample, NOISE_THRESHOLD};

/// Calcula los deltas entre muestras consecutivas.
/// Con n muestras devuelve n-1 deltas (ninguno si n <= 1).
pub fn compute(samples: &[Sample]) -> Vec<Delta> {
    samples
        .windows(2)
        .map(|pair| delta_between(&pair[0], &pair[1]))
        .collect()
}

/// Diferencia absoluta por eje entre dos muestras, más la clasificación de ruido
pub fn delta_between(a: &Sample, b: &Sample) -> Delta {
    let mut delta = Delta {
        dlt_x: a.x.abs_diff(b.x),
        dlt_y: a.y.abs_diff(b.y),
        dlt_z: a.z.abs_diff(b.z),
        noise: false,
    };
    delta.noise = delta.total() > NOISE_THRESHOLD;
    delta
}

/// Cuenta los deltas que superan el umbral de ruido y además alcanzan
/// los tres umbrales por eje del patrón
pub fn count_matches(deltas: &[Delta], spec: &MotionSpec) -> u32 {
    deltas
        .iter()
        .filter(|d| {
            d.noise && d.dlt_x >= spec.dlt_x && d.dlt_y >= spec.dlt_y && d.dlt_z >= spec.dlt_z
        })
        .count() as u32
}

/// true si la ventana coincide con el patrón (spec.freq ya debe estar limitada)
pub fn matches(deltas: &[Delta], spec: &MotionSpec) -> bool {
    count_matches(deltas, spec) >= spec.freq
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternating_x(n: usize, high: i32) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::new(if i % 2 == 0 { 0 } else { high }, 0, 0))
            .collect()
    }

    #[test]
    fn test_compute_lengths() {
        assert!(compute(&[]).is_empty());
        assert!(compute(&[Sample::new(1, 1, 1)]).is_empty());
        for n in 2..30 {
            let samples = alternating_x(n, 10);
            assert_eq!(compute(&samples).len(), n - 1);
        }
    }

    #[test]
    fn test_delta_symmetric() {
        let pairs = [
            (Sample::new(-300, 20, 7), Sample::new(150, -80, 7)),
            (Sample::new(i32::MIN, 0, i32::MAX), Sample::new(i32::MAX, 0, i32::MIN)),
            (Sample::new(5, 5, 5), Sample::new(5, 5, 5)),
        ];
        for (a, b) in pairs {
            assert_eq!(delta_between(&a, &b), delta_between(&b, &a));
        }
    }

    #[test]
    fn test_noise_is_strictly_above_threshold() {
        let at = delta_between(&Sample::new(0, 0, 0), &Sample::new(100, 50, 50));
        assert_eq!(at.total(), 200);
        assert!(!at.noise);

        let above = delta_between(&Sample::new(0, 0, 0), &Sample::new(100, 50, 51));
        assert!(above.noise);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let d = delta_between(
            &Sample::new(i32::MIN, i32::MIN, i32::MIN),
            &Sample::new(i32::MAX, i32::MAX, i32::MAX),
        );
        assert_eq!(d.dlt_x, u32::MAX);
        assert!(d.noise);
    }

    #[test]
    fn test_count_horizontal_shake() {
        // 21 muestras alternando 0 y 450 => 20 deltas de 450 en x
        let deltas = compute(&alternating_x(21, 450));
        let horizontal = MotionSpec::new(400, 0, 0, 4);
        assert_eq!(count_matches(&deltas, &horizontal), 20);
        assert!(matches(&deltas, &horizontal));

        // El mismo movimiento no alcanza un patrón que exige también el eje y
        let shake = MotionSpec::new(400, 400, 0, 4);
        assert_eq!(count_matches(&deltas, &shake), 0);
        assert!(!matches(&deltas, &shake));
    }

    #[test]
    fn test_small_variation_never_matches() {
        let samples: Vec<Sample> = (0..21)
            .map(|i| Sample::new(i % 3 * 30, i % 2 * 40, 0))
            .collect();
        let deltas = compute(&samples);
        assert!(deltas.iter().all(|d| !d.noise));
        assert_eq!(count_matches(&deltas, &MotionSpec::new(0, 0, 0, 1)), 0);
    }

    #[test]
    fn test_freq_zero_always_matches() {
        assert!(matches(&[], &MotionSpec::new(1000, 1000, 1000, 0)));
    }
}
