//! Shrink-to-fit font size search.

use textmesh_core::math::floor_to;
use textmesh_core::profiling::profile_function;

use crate::config::TypesetConfig;

/// Largest size in `[min, max]` for which `overflows` reports false, within the configured
/// tolerance.
///
/// `min` is returned when nothing fits. The result is floored to the configured precision so
/// repeated searches land on the same value.
pub fn fit_font_size(
    min: f32,
    max: f32,
    config: &TypesetConfig,
    mut overflows: impl FnMut(f32) -> bool,
) -> f32 {
    profile_function!();

    let min = min.max(0.0);
    if max <= min {
        return min;
    }

    let mut best = min;
    let mut iterations = 0;
    if !overflows(max) {
        best = max;
    } else {
        let (mut low, mut high) = (min, max);
        while iterations < config.autofit_max_iterations && high - low >= config.autofit_tolerance {
            let mid = (low + high) * 0.5;
            if overflows(mid) {
                high = mid;
            } else {
                best = mid;
                low = mid;
            }
            iterations += 1;
        }
    }

    let fitted = floor_to(best.max(min), config.autofit_precision).clamp(min, max);
    tracing::trace!("Auto-fit chose {} after {} probes in [{}, {}]", fitted, iterations + 1, min, max);
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_fits() {
        let size = fit_font_size(10.0, 40.0, &TypesetConfig::default(), |_| false);
        assert_eq!(size, 40.0);
    }

    #[test]
    fn test_nothing_fits() {
        let size = fit_font_size(10.0, 40.0, &TypesetConfig::default(), |_| true);
        assert_eq!(size, 10.0);
    }

    #[test]
    fn test_converges_below_threshold() {
        let threshold = 23.7;
        let size = fit_font_size(10.0, 40.0, &TypesetConfig::default(), |s| s > threshold);
        assert!(size <= threshold);
        assert!(threshold - size < 0.5);
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(fit_font_size(20.0, 12.0, &TypesetConfig::default(), |_| true), 20.0);
    }

    #[test]
    fn test_iteration_cap() {
        let config = TypesetConfig {
            autofit_max_iterations: 2,
            ..TypesetConfig::default()
        };
        let mut probes = 0;
        fit_font_size(0.0, 1000.0, &config, |s| {
            probes += 1;
            s > 1.0
        });
        assert_eq!(probes, 3);
    }
}
