//! # Consistency Checks
//!
//! The config format happily accepts parameters that cannot produce a
//! sensible mesh, e.g. `min_spac` above `max_spac`. [`MeshConfig::check`]
//! reports those as errors. Settings that are merely inert, such as bed
//! thresholds while `use_bed = False`, are warnings: sample configs ship
//! them populated so a user can flip the toggle.

use serde::Serialize;

use crate::config::MeshConfig;

/// Findings from [`MeshConfig::check`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeshReport {
    /// Inconsistencies the mesh generator cannot work with.
    pub errors: Vec<String>,
    /// Settings that have no effect or look unintended.
    pub warnings: Vec<String>,
}

impl MeshReport {
    /// Whether no errors were found. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl MeshConfig {
    /// Check the relations between parameters.
    pub fn check(&self) -> MeshReport {
        let mut report = MeshReport::default();

        let mut require_below = |low_name: &str, low: f64, high_name: &str, high: f64| {
            if !(low < high) {
                report.add_error(format!(
                    "{low_name} ({low}) must be less than {high_name} ({high})"
                ));
            }
        };
        require_below("x_min", self.x_min, "x_max", self.x_max);
        require_below("y_min", self.y_min, "y_max", self.y_max);
        require_below("min_spac", self.min_spac, "max_spac", self.max_spac);
        require_below("low_dist", self.low_dist, "high_dist", self.high_dist);
        if self.use_speed {
            require_below(
                "low_log_speed",
                self.low_log_speed,
                "high_log_speed",
                self.high_log_speed,
            );
        }
        if self.use_bed {
            require_below(
                "low_dist_bed",
                self.low_dist_bed,
                "high_dist_bed",
                self.high_dist_bed,
            );
            require_below("low_bed", self.low_bed, "high_bed", self.high_bed);
        }

        if self.min_spac <= 0.0 {
            report.add_error(format!("min_spac ({}) must be positive", self.min_spac));
        }

        if self.density_functions().is_empty() {
            report.add_error(
                "no density function enabled: set at least one of use_speed, \
                 use_dist_to_grounding_line, use_dist_to_edge, use_bed"
                    .to_string(),
            );
        }

        if !self.use_bed {
            report.add_warning(
                "bed thresholds (high_dist_bed, low_dist_bed, low_bed, high_bed) \
                 are ignored because use_bed is False"
                    .to_string(),
            );
        }

        for warning in &report.warnings {
            tracing::warn!("{warning}");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::SAMPLE;

    fn sample() -> MeshConfig {
        SAMPLE.parse().unwrap()
    }

    #[test]
    fn sample_has_no_errors() {
        let report = sample().check();
        assert!(report.is_ok(), "{:?}", report.errors);
    }

    #[test]
    fn sample_warns_about_inert_bed_thresholds() {
        let report = sample().check();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("use_bed"));
    }

    #[test]
    fn inverted_spacing_is_an_error() {
        let mut mesh = sample();
        mesh.min_spac = 40e3;
        let report = mesh.check();
        assert!(!report.is_ok());
        assert!(report.errors.iter().any(|e| e.contains("min_spac")));
    }

    #[test]
    fn inverted_distances_is_an_error() {
        let mut mesh = sample();
        mesh.low_dist = mesh.high_dist;
        let report = mesh.check();
        assert!(report.errors.iter().any(|e| e.contains("low_dist")));
    }

    #[test]
    fn no_density_function_is_an_error() {
        let mut mesh = sample();
        mesh.use_speed = false;
        mesh.use_dist_to_edge = false;
        let report = mesh.check();
        assert!(report.errors.iter().any(|e| e.contains("no density function")));
    }

    #[test]
    fn bed_thresholds_checked_only_when_bed_enabled() {
        let mut mesh = sample();
        mesh.low_bed = 200.0;
        assert!(mesh.check().is_ok());

        mesh.use_bed = true;
        let report = mesh.check();
        assert!(report.errors.iter().any(|e| e.contains("low_bed")));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn speed_thresholds_ignored_when_speed_disabled() {
        let mut mesh = sample();
        mesh.low_log_speed = 3.0;
        assert!(!mesh.check().is_ok());
        mesh.use_speed = false;
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn nan_bounds_are_errors() {
        let mut mesh = sample();
        mesh.x_max = f64::NAN;
        assert!(!mesh.check().is_ok());
    }
}
