//! Rescale decoded volumes into the unit interval.

use tracing::debug;

use crate::decode::{Volume, VolumeData};
use crate::element::element_spec;

/// Rescale every element to `[0, 1]` using the volume's decoded bounds.
///
/// Element types rendered at native width are left untouched, as is a volume
/// that was already normalized. The original `min`/`max` are kept so color
/// limits can still be expressed in data units. Returns whether any element
/// was rewritten.
pub fn normalize_volume(volume: &mut Volume) -> bool {
    if volume.normalized || !element_spec(volume.element_type).normalize {
        return false;
    }
    let VolumeData::Float(values) = &mut volume.data else {
        return false;
    };

    let (min, max) = (volume.min, volume.max);
    let range = max - min;
    if range > 0.0 && range.is_finite() {
        for v in values.iter_mut() {
            *v = ((*v as f64 - min) / range).clamp(0.0, 1.0) as f32;
        }
    } else {
        // flat or empty volume
        values.iter_mut().for_each(|v| *v = 0.0);
    }

    debug!(variable = %volume.variable, min, max, "Normalized volume");
    volume.normalized = true;
    true
}
