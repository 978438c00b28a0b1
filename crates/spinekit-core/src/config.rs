use crate::classify::{
    angle_balance_table, cobb_table, meyerding_table, stenosis_table, trunk_shift_table,
    BalanceLimit, CurveSeverity, MeyerdingGrade, SagittalBalance, StenosisSeverity,
    ThresholdTable, TrunkShiftSeverity,
};
use crate::curvature::SpinalRegion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpineConfig {
    /// Scale applied to every canvas-unit distance; areas use its square.
    pub mm_per_pixel: f64,
    pub polygon_close_threshold: f64,
    /// Allowed |PI - (PT + SS)| before the spinopelvic triple is flagged.
    pub spinopelvic_tolerance_deg: f64,
    pub thresholds: SeverityConfig,
    pub implants: ImplantConfig,
    pub simulation: SimulationConfig,
}

impl Default for SpineConfig {
    fn default() -> Self {
        Self {
            mm_per_pixel: 1.0,
            polygon_close_threshold: 15.0,
            spinopelvic_tolerance_deg: 2.0,
            thresholds: SeverityConfig::default(),
            implants: ImplantConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl SpineConfig {
    pub fn mm(&self, canvas_units: f64) -> f64 {
        canvas_units * self.mm_per_pixel
    }

    pub fn mm2(&self, canvas_area: f64) -> f64 {
        canvas_area * self.mm_per_pixel * self.mm_per_pixel
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityConfig {
    pub meyerding: ThresholdTable<MeyerdingGrade>,
    pub stenosis: ThresholdTable<StenosisSeverity>,
    pub scoliosis_cobb: ThresholdTable<CurveSeverity>,
    pub trunk_shift: ThresholdTable<TrunkShiftSeverity>,
    /// Falls back to `scoliosis_cobb` for regions not listed.
    pub curvature_by_region: BTreeMap<SpinalRegion, ThresholdTable<CurveSeverity>>,
    pub sva: BalanceLimit,
    pub csva: BalanceLimit,
    pub tpa: ThresholdTable<SagittalBalance>,
    pub pelvic_tilt: ThresholdTable<SagittalBalance>,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            meyerding: meyerding_table(),
            stenosis: stenosis_table(),
            scoliosis_cobb: cobb_table(),
            trunk_shift: trunk_shift_table(),
            curvature_by_region: BTreeMap::new(),
            sva: BalanceLimit::new(50.0),
            csva: BalanceLimit::new(40.0),
            tpa: angle_balance_table(20.0),
            pelvic_tilt: angle_balance_table(20.0),
        }
    }
}

impl SeverityConfig {
    pub fn curvature(&self, region: SpinalRegion) -> &ThresholdTable<CurveSeverity> {
        self.curvature_by_region
            .get(&region)
            .unwrap_or(&self.scoliosis_cobb)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplantConfig {
    pub screw_hit_radius: f64,
    pub screw_default_length: f64,
    /// Radians per arrow-key press.
    pub screw_rotate_step: f64,
    pub cage_default_width: f64,
    pub cage_default_height: f64,
    /// Radians per rotate key press.
    pub cage_rotate_step: f64,
    pub cage_width_step: f64,
    pub cage_height_step: f64,
    pub cage_min_width: f64,
    pub cage_max_width: f64,
    pub cage_min_height: f64,
    pub cage_max_height: f64,
    pub rod_curvature: f64,
}

impl Default for ImplantConfig {
    fn default() -> Self {
        Self {
            screw_hit_radius: 15.0,
            screw_default_length: 60.0,
            screw_rotate_step: 0.1,
            cage_default_width: 40.0,
            cage_default_height: 15.0,
            cage_rotate_step: std::f64::consts::PI / 12.0,
            cage_width_step: 5.0,
            cage_height_step: 2.0,
            cage_min_width: 20.0,
            cage_max_width: 80.0,
            cage_min_height: 8.0,
            cage_max_height: 25.0,
            rod_curvature: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Vertical disc gap, in pixels, opened by the listhesis correction.
    pub listhesis_gap: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { listhesis_gap: 20.0 }
    }
}
