//! Reversible mapping between a volume's native range and the 8-bit
//! tracking domain the motion estimators operate on.

use ndarray::{Array2, ArrayD};

use crate::volume::pixel::Pixel;

/// Rescale a whole volume into the 8-bit tracking domain.
///
/// The global min/max is computed once across the entire volume so every
/// frame shares one affine mapping. A degenerate range (`min == max`, e.g.
/// an all-black volume) maps to all zeros instead of dividing by zero.
///
/// Returns the 8-bit copy together with the native `(min, max)` needed to
/// invert the mapping.
pub fn to_tracking_domain<T: Pixel>(volume: &ArrayD<T>) -> (ArrayD<u8>, f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in volume.iter() {
        let f = v.to_f32();
        if f < min {
            min = f;
        }
        if f > max {
            max = f;
        }
    }

    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return (ArrayD::zeros(volume.raw_dim()), 0.0, 0.0);
    }

    let tracking = volume.mapv(|v| ((v.to_f32() - min) / range * 255.0) as u8);
    (tracking, min, max)
}

/// Invert the tracking-domain mapping for a single frame.
///
/// Applies the exact inverse affine map and casts back to the native type;
/// out-of-range values follow the native cast, with no extra clamping.
pub fn from_tracking_domain<T: Pixel>(frame: &Array2<u8>, min: f32, max: f32) -> Array2<T> {
    let range = max - min;
    frame.mapv(|v| T::from_f32(v as f32 / 255.0 * range + min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_tracking_domain_spans_full_u8_range() {
        let volume = ArrayD::from_shape_vec(IxDyn(&[1, 2, 2]), vec![100u16, 612, 1124, 2148]).unwrap();
        let (tracking, min, max) = to_tracking_domain(&volume);
        assert_eq!(min, 100.0);
        assert_eq!(max, 2148.0);
        assert_eq!(tracking[[0, 0, 0]], 0);
        assert_eq!(tracking[[0, 1, 1]], 255);
    }

    #[test]
    fn test_zero_range_maps_to_zeros() {
        let volume = ArrayD::from_elem(IxDyn(&[2, 3, 3]), 42u16);
        let (tracking, min, max) = to_tracking_domain(&volume);
        assert_eq!(min, 0.0);
        assert_eq!(max, 0.0);
        assert!(tracking.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_round_trip_within_one_quantization_step() {
        let values: Vec<u16> = (0..64).map(|i| 17 * i + 3).collect();
        let volume = ArrayD::from_shape_vec(IxDyn(&[1, 8, 8]), values.clone()).unwrap();
        let (tracking, min, max) = to_tracking_domain(&volume);
        let step = (max - min) / 255.0;

        let frame = tracking
            .index_axis_move(ndarray::Axis(0), 0)
            .into_dimensionality::<ndarray::Ix2>()
            .unwrap();
        let restored: Array2<u16> = from_tracking_domain(&frame, min, max);
        for (orig, rec) in values.iter().zip(restored.iter()) {
            assert!(
                (*orig as f32 - *rec as f32).abs() <= step + 1.0,
                "orig {orig} restored {rec} step {step}"
            );
        }
    }
}
