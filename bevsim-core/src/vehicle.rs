//! Module containing vehicle struct and related functions.

use crate::error::ConfigValidationError;
use crate::imports::*;
use validator::Validate;

// veh_pt_type options; only battery-electric powertrains are supported
pub const BEV: &str = "BEV";
pub const VEH_PT_TYPES: [&str; 1] = [BEV];

/// Struct containing vehicle attributes for a battery-electric vehicle.
///
/// Unknown keys in a config document are ignored; missing required keys or
/// out-of-range values fail construction with [ConfigValidationError], with
/// all violations collected rather than just the first.
#[derive(Default, Serialize, Deserialize, Clone, Debug, PartialEq, Validate)]
#[serde(try_from = "VehicleDoc")]
pub struct Vehicle {
    /// Vehicle name
    pub veh_name: String,
    /// Vehicle powertrain type, must be [BEV](BEV)
    pub veh_pt_type: String,

    // --- mass terms ---
    /// Vehicle mass excluding cargo and powertrain components, $kg$
    #[validate(range(min = 0))]
    pub glider_kg: f64,
    /// Traction motor and inverter mass, $kg$
    #[validate(range(min = 0))]
    pub mc_mass_kg: f64,
    /// Energy storage system mass, $kg$
    #[validate(range(min = 0))]
    pub ess_mass_kg: f64,
    /// Cargo mass including passengers, $kg$
    #[validate(range(min = 0))]
    pub cargo_kg: f64,
    /// Auxiliary component mass (HVAC, pumps, etc.), $kg$
    #[validate(range(min = 0))]
    pub comp_mass_kg: f64,

    // --- road load ---
    /// Aerodynamic drag coefficient
    pub drag_coef: f64,
    /// Frontal area, $m^2$
    pub frontal_area_m2: f64,
    /// Rolling resistance coefficient
    pub wheel_rr_coef: f64,
    /// Effective wheel radius, $m$
    pub wheel_radius_m: f64,

    // --- driveline ---
    /// Peak electric motor power, $kW$
    pub mc_max_kw: f64,
    /// Electric motor peak efficiency
    #[validate(range(min = 0, max = 1))]
    pub mc_peak_eff: f64,
    /// Final drive efficiency
    #[validate(range(min = 0, max = 1))]
    pub fd_eff: f64,
    /// Final drive ratio
    pub fd_ratio: f64,
    /// Peak axle torque at the motor shaft, $N \cdot m$
    pub max_trq_nm: f64,

    // --- energy storage ---
    /// Traction battery usable energy capacity, $kWh$
    pub ess_max_kwh: f64,
    /// Traction battery maximum charge/discharge power, $kW$
    pub ess_max_kw: f64,
    /// Traction battery minimum state of charge
    #[validate(range(min = 0, max = 1))]
    pub min_soc: f64,
    /// Traction battery maximum state of charge
    #[validate(range(min = 0, max = 1))]
    pub max_soc: f64,
    /// Traction battery round-trip efficiency
    #[validate(range(min = 0, max = 1))]
    pub ess_round_trip_eff: f64,

    // --- auxiliaries ---
    /// Constant auxiliary electrical load (hotel loads, compressors), $kW$
    #[validate(range(min = 0))]
    pub aux_kw: f64,

    /// Total vehicle mass, derived from the component masses, $kg$
    #[serde(skip)]
    pub veh_kg: f64,
}

/// Permissive mirror of [Vehicle] that deserialization goes through, so a
/// document missing several required keys reports all of them at once
/// instead of failing on the first.
#[derive(Deserialize)]
struct VehicleDoc {
    #[serde(alias = "name")]
    veh_name: Option<String>,
    veh_pt_type: Option<String>,
    glider_kg: Option<f64>,
    mc_mass_kg: Option<f64>,
    ess_mass_kg: Option<f64>,
    cargo_kg: Option<f64>,
    comp_mass_kg: Option<f64>,
    drag_coef: Option<f64>,
    frontal_area_m2: Option<f64>,
    #[serde(alias = "rr_coeff")]
    wheel_rr_coef: Option<f64>,
    #[serde(alias = "wheel_rr_radius_m")]
    wheel_radius_m: Option<f64>,
    mc_max_kw: Option<f64>,
    #[serde(alias = "mc_peak_efficiency")]
    mc_peak_eff: Option<f64>,
    #[serde(alias = "fd_efficiency")]
    fd_eff: Option<f64>,
    fd_ratio: Option<f64>,
    max_trq_nm: Option<f64>,
    ess_max_kwh: Option<f64>,
    ess_max_kw: Option<f64>,
    min_soc: Option<f64>,
    max_soc: Option<f64>,
    #[serde(alias = "ess_round_trip_efficiency")]
    ess_round_trip_eff: Option<f64>,
    aux_kw: Option<f64>,
}

fn required<T: Default>(field: &'static str, value: Option<T>, missing: &mut Vec<String>) -> T {
    value.unwrap_or_else(|| {
        missing.push(format!("{field}: missing required field"));
        T::default()
    })
}

impl TryFrom<VehicleDoc> for Vehicle {
    type Error = ConfigValidationError;

    fn try_from(doc: VehicleDoc) -> Result<Self, Self::Error> {
        let mut missing: Vec<String> = Vec::new();
        let veh = Self {
            veh_name: required("veh_name", doc.veh_name, &mut missing),
            veh_pt_type: required("veh_pt_type", doc.veh_pt_type, &mut missing),
            glider_kg: required("glider_kg", doc.glider_kg, &mut missing),
            mc_mass_kg: required("mc_mass_kg", doc.mc_mass_kg, &mut missing),
            ess_mass_kg: required("ess_mass_kg", doc.ess_mass_kg, &mut missing),
            cargo_kg: required("cargo_kg", doc.cargo_kg, &mut missing),
            comp_mass_kg: required("comp_mass_kg", doc.comp_mass_kg, &mut missing),
            drag_coef: required("drag_coef", doc.drag_coef, &mut missing),
            frontal_area_m2: required("frontal_area_m2", doc.frontal_area_m2, &mut missing),
            wheel_rr_coef: required("wheel_rr_coef", doc.wheel_rr_coef, &mut missing),
            wheel_radius_m: required("wheel_radius_m", doc.wheel_radius_m, &mut missing),
            mc_max_kw: required("mc_max_kw", doc.mc_max_kw, &mut missing),
            mc_peak_eff: required("mc_peak_eff", doc.mc_peak_eff, &mut missing),
            fd_eff: required("fd_eff", doc.fd_eff, &mut missing),
            fd_ratio: required("fd_ratio", doc.fd_ratio, &mut missing),
            max_trq_nm: required("max_trq_nm", doc.max_trq_nm, &mut missing),
            ess_max_kwh: required("ess_max_kwh", doc.ess_max_kwh, &mut missing),
            ess_max_kw: required("ess_max_kw", doc.ess_max_kw, &mut missing),
            min_soc: required("min_soc", doc.min_soc, &mut missing),
            max_soc: required("max_soc", doc.max_soc, &mut missing),
            ess_round_trip_eff: required(
                "ess_round_trip_eff",
                doc.ess_round_trip_eff,
                &mut missing,
            ),
            aux_kw: required("aux_kw", doc.aux_kw, &mut missing),
            veh_kg: 0.0,
        };
        if missing.is_empty() {
            Ok(veh)
        } else {
            missing.sort();
            Err(ConfigValidationError {
                violations: missing,
            })
        }
    }
}

impl SerdeAPI for Vehicle {
    fn init(&mut self) -> anyhow::Result<()> {
        Ok(self.set_derived()?)
    }
}

impl Vehicle {
    /// Validate the full parameter set, collecting every violation.
    pub fn validate_config(&self) -> Result<(), ConfigValidationError> {
        let mut violations: Vec<String> = Vec::new();

        if let Err(errors) = self.validate() {
            for (field, field_errors) in errors.field_errors() {
                for error in field_errors {
                    violations.push(format!("{field}: {error}"));
                }
            }
        }

        if !VEH_PT_TYPES.contains(&self.veh_pt_type.as_str()) {
            violations.push(format!(
                "veh_pt_type: {:?} must be one of {VEH_PT_TYPES:?}",
                self.veh_pt_type
            ));
        }
        for (field, value) in [
            ("drag_coef", self.drag_coef),
            ("frontal_area_m2", self.frontal_area_m2),
            ("wheel_rr_coef", self.wheel_rr_coef),
            ("wheel_radius_m", self.wheel_radius_m),
            ("mc_max_kw", self.mc_max_kw),
            ("mc_peak_eff", self.mc_peak_eff),
            ("fd_eff", self.fd_eff),
            ("fd_ratio", self.fd_ratio),
            ("max_trq_nm", self.max_trq_nm),
            ("ess_max_kwh", self.ess_max_kwh),
            ("ess_max_kw", self.ess_max_kw),
            ("ess_round_trip_eff", self.ess_round_trip_eff),
        ] {
            if !(value > 0.0) {
                violations.push(format!("{field}: {value} must be greater than 0"));
            }
        }
        if self.min_soc >= self.max_soc {
            violations.push(format!(
                "min_soc: {} must be less than max_soc {}",
                self.min_soc, self.max_soc
            ));
        }

        violations.sort();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError { violations })
        }
    }

    /// Validate and set fields derived from the input parameters.
    pub fn set_derived(&mut self) -> Result<(), ConfigValidationError> {
        self.validate_config()?;
        self.veh_kg =
            self.glider_kg + self.mc_mass_kg + self.ess_mass_kg + self.cargo_kg + self.comp_mass_kg;
        Ok(())
    }

    /// Load a vehicle bundled with the crate by name, e.g. `class8_bev`.
    #[cfg(feature = "resources")]
    pub fn from_resource(name: &str) -> anyhow::Result<Self> {
        let file_name = format!("{}.yaml", name.to_lowercase());
        let file = crate::resources::RESOURCES_DIR
            .get_file(format!("vehdb/{file_name}"))
            .with_context(|| {
                format!(
                    "bundled vehicle {name:?} not found; available: {:?}",
                    crate::resources::list_resources("vehdb")
                )
            })?;
        Self::from_yaml(file.contents_utf8().with_context(|| {
            format!("bundled vehicle {file_name:?} is not valid utf-8")
        })?)
    }

    /// Class 8 battery-electric day cab with publicly plausible parameters,
    /// used as the CLI default and in tests.
    pub fn mock_vehicle() -> Self {
        let mut veh = Self {
            veh_name: String::from("Class 8 BEV Day Cab"),
            veh_pt_type: String::from(BEV),
            glider_kg: 10500.0,
            mc_mass_kg: 450.0,
            ess_mass_kg: 2500.0,
            cargo_kg: 8000.0,
            comp_mass_kg: 300.0,
            drag_coef: 0.6,
            frontal_area_m2: 10.0,
            wheel_rr_coef: 0.0065,
            wheel_radius_m: 0.5,
            mc_max_kw: 400.0,
            mc_peak_eff: 0.95,
            fd_eff: 0.97,
            fd_ratio: 3.5,
            max_trq_nm: 3500.0,
            ess_max_kwh: 396.0,
            ess_max_kw: 400.0,
            min_soc: 0.1,
            max_soc: 0.9,
            ess_round_trip_eff: 0.93,
            aux_kw: 2.0,
            veh_kg: 0.0,
        };
        veh.set_derived().unwrap();
        veh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_vehicle_is_valid() {
        let veh = Vehicle::mock_vehicle();
        assert_eq!(veh.veh_pt_type, BEV);
        assert_eq!(veh.veh_kg, 21750.0);
    }

    #[test]
    fn test_all_violations_are_collected() {
        let mut veh = Vehicle::mock_vehicle();
        veh.drag_coef = 0.0;
        veh.mc_peak_eff = 1.2;
        veh.min_soc = 0.9;
        veh.max_soc = 0.1;
        let err = veh.validate_config().unwrap_err();
        assert!(err.violations.len() >= 3);
        assert!(err.violations.iter().any(|v| v.starts_with("drag_coef")));
        assert!(err.violations.iter().any(|v| v.starts_with("mc_peak_eff")));
        assert!(err.violations.iter().any(|v| v.starts_with("min_soc")));
    }

    #[test]
    fn test_missing_required_keys_are_all_reported() {
        let yaml = "veh_name: partial\nveh_pt_type: BEV\ndrag_coef: 0.6\n";
        let err = Vehicle::from_yaml(yaml).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("glider_kg: missing required field"));
        assert!(msg.contains("aux_kw: missing required field"));
        assert!(msg.contains("ess_max_kwh: missing required field"));
    }

    #[test]
    fn test_non_bev_powertrain_is_rejected() {
        let mut veh = Vehicle::mock_vehicle();
        veh.veh_pt_type = String::from("HEV");
        let err = veh.validate_config().unwrap_err();
        assert!(err.violations.iter().any(|v| v.starts_with("veh_pt_type")));
    }

    #[test]
    #[cfg(feature = "resources")]
    fn test_bundled_vehicle_loads() {
        let veh = Vehicle::from_resource("class8_bev").unwrap();
        assert_eq!(veh.veh_pt_type, BEV);
        assert_eq!(veh.veh_kg, 21750.0);
    }

    #[test]
    fn test_yaml_round_trip_ignores_unknown_keys() {
        let veh = Vehicle::mock_vehicle();
        let mut yaml = veh.to_yaml().unwrap();
        yaml.push_str("some_future_key: 42.0\n");
        let de = Vehicle::from_yaml(&yaml).unwrap();
        assert_eq!(de, veh);
    }
}
