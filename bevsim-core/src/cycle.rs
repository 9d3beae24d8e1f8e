//! Module containing drive cycle struct and related functions.

use crate::error::CycleLoadError;
use crate::imports::*;
use crate::utils::*;

/// One row of a tabular cycle file.
#[derive(Default, PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct CycleElement {
    /// time [s]
    pub time_s: f64,
    /// speed [m/s]
    #[serde(alias = "mps")]
    pub speed_mps: f64,
}

/// An ordered speed-vs-time trace used as simulation input.
///
/// Invariants, checked on every construction path: at least one sample, time
/// strictly increasing and non-negative, speed non-negative.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Cycle {
    /// array of time [s]
    pub time_s: Array1<f64>,
    /// array of speed [m/s]
    pub mps: Array1<f64>,
    pub name: String,
}

impl Cycle {
    /// Load a cycle by bundled standard-cycle name or by filesystem path.
    /// A string naming an existing file is treated as a path; anything else is
    /// looked up in the bundled `cycles/` resources.
    pub fn load<S: AsRef<str>>(name_or_path: S) -> Result<Self, CycleLoadError> {
        let name_or_path = name_or_path.as_ref();
        if Path::new(name_or_path).is_file() {
            Self::from_csv_file(name_or_path)
        } else {
            #[cfg(feature = "resources")]
            {
                Self::from_resource(name_or_path)
            }
            #[cfg(not(feature = "resources"))]
            {
                Err(CycleLoadError::NotFound {
                    path: name_or_path.to_string(),
                })
            }
        }
    }

    /// Load cycle from CSV file, parsing name from filepath
    pub fn from_csv_file<P: AsRef<Path>>(filepath: P) -> Result<Self, CycleLoadError> {
        let filepath = filepath.as_ref();
        let path = filepath.to_string_lossy().to_string();
        let name = filepath
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_string();
        let file = File::open(filepath).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CycleLoadError::NotFound { path: path.clone() }
            } else {
                CycleLoadError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        Self::from_csv_reader(file, name, &path)
    }

    /// Load a bundled standard cycle by name, e.g. `"udds"`.
    #[cfg(feature = "resources")]
    pub fn from_resource<S: AsRef<str>>(name: S) -> Result<Self, CycleLoadError> {
        let name = name.as_ref().to_lowercase();
        let file = crate::resources::RESOURCES_DIR
            .get_file(format!("cycles/{name}.csv"))
            .ok_or_else(|| CycleLoadError::UnknownName {
                name: name.clone(),
                available: crate::resources::list_resources("cycles")
                    .iter()
                    .map(|f| f.trim_end_matches(".csv").to_string())
                    .collect(),
            })?;
        Self::from_csv_reader(file.contents(), name.clone(), &format!("cycles/{name}.csv"))
    }

    fn from_csv_reader<R: std::io::Read>(
        rdr: R,
        name: String,
        path: &str,
    ) -> Result<Self, CycleLoadError> {
        let mut time_s: Vec<f64> = Vec::new();
        let mut mps: Vec<f64> = Vec::new();
        let mut rdr = csv::Reader::from_reader(rdr);
        for result in rdr.deserialize() {
            let elem: CycleElement = result.map_err(|source| CycleLoadError::Parse {
                path: path.to_string(),
                source,
            })?;
            time_s.push(elem.time_s);
            mps.push(elem.speed_mps);
        }
        let cyc = Self {
            time_s: Array::from_vec(time_s),
            mps: Array::from_vec(mps),
            name,
        };
        cyc.init_checks()?;
        Ok(cyc)
    }

    /// Concatenate cycles in the given order into a single monotonic trace.
    ///
    /// Each subsequent cycle's time axis is re-based so that its first sample
    /// lands on the previous cycle's last time; that duplicate boundary sample
    /// is dropped. Order is preserved exactly as given.
    pub fn concat(cycles: &[Cycle]) -> Result<Self, CycleLoadError> {
        let first = cycles.first().ok_or(CycleLoadError::EmptyConcat)?;
        let mut time_s = first.time_s.to_vec();
        let mut mps = first.mps.to_vec();
        let mut names: Vec<&str> = vec![&first.name];
        for cyc in &cycles[1..] {
            let t_end = *time_s.last().unwrap();
            let offset = t_end - cyc.time_s[0];
            // skip the re-based first sample; it coincides with the previous end
            for i in 1..cyc.len() {
                time_s.push(cyc.time_s[i] + offset);
                mps.push(cyc.mps[i]);
            }
            names.push(&cyc.name);
        }
        let cyc = Self {
            time_s: Array::from_vec(time_s),
            mps: Array::from_vec(mps),
            name: names.join("+"),
        };
        cyc.init_checks()?;
        Ok(cyc)
    }

    fn init_checks(&self) -> Result<(), CycleLoadError> {
        if self.is_empty() {
            return Err(CycleLoadError::Empty {
                name: self.name.clone(),
            });
        }
        if self.time_s[0] < 0.0 {
            return Err(CycleLoadError::NegativeTime {
                index: 0,
                value: self.time_s[0],
            });
        }
        for i in 1..self.len() {
            if self.time_s[i] <= self.time_s[i - 1] {
                return Err(CycleLoadError::NonMonotonicTime {
                    index: i,
                    prev: self.time_s[i - 1],
                    next: self.time_s[i],
                });
            }
        }
        if let Some(i) = self.mps.iter().position(|&v| v < 0.0) {
            return Err(CycleLoadError::NegativeSpeed {
                index: i,
                value: self.mps[i],
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// rust-internal time steps
    pub fn dt_s(&self) -> Array1<f64> {
        diff(&self.time_s)
    }

    /// rust-internal time steps at i
    pub fn dt_s_at_i(&self, i: usize) -> f64 {
        self.time_s[i] - self.time_s[i - 1]
    }

    /// distance covered in each time step
    pub fn dist_m(&self) -> Array1<f64> {
        &self.mps * self.dt_s()
    }

    pub fn test_cyc() -> Self {
        Self {
            time_s: Array::range(0.0, 10.0, 1.0),
            mps: Array::range(0.0, 10.0, 1.0),
            name: String::from("test"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dist() {
        let cyc = Cycle::test_cyc();
        assert_eq!(cyc.dist_m().sum(), 45.0);
    }

    #[test]
    fn test_concat_rebases_time_and_drops_boundary_sample() {
        let a = Cycle {
            time_s: array![0.0, 50.0, 100.0],
            mps: array![0.0, 10.0, 0.0],
            name: String::from("a"),
        };
        let b = Cycle {
            time_s: array![0.0, 30.0, 60.0],
            mps: array![0.0, 20.0, 0.0],
            name: String::from("b"),
        };
        let joined = Cycle::concat(&[a, b]).unwrap();
        assert_eq!(joined.name, "a+b");
        assert_eq!(joined.time_s, array![0.0, 50.0, 100.0, 130.0, 160.0]);
        assert_eq!(joined.mps, array![0.0, 10.0, 0.0, 20.0, 0.0]);
        // strictly increasing, no duplicate at the join
        for i in 1..joined.len() {
            assert!(joined.time_s[i] > joined.time_s[i - 1]);
        }
    }

    #[test]
    fn test_concat_of_nothing_fails() {
        assert!(matches!(
            Cycle::concat(&[]),
            Err(CycleLoadError::EmptyConcat)
        ));
    }

    #[test]
    fn test_non_monotonic_time_is_rejected() {
        let csv = "time_s,speed_mps\n0.0,0.0\n2.0,1.0\n1.0,2.0\n";
        let err = Cycle::from_csv_reader(csv.as_bytes(), "bad".into(), "bad.csv").unwrap_err();
        assert!(matches!(
            err,
            CycleLoadError::NonMonotonicTime { index: 2, .. }
        ));
    }

    #[test]
    fn test_negative_speed_is_rejected() {
        let csv = "time_s,speed_mps\n0.0,0.0\n1.0,-1.0\n";
        let err = Cycle::from_csv_reader(csv.as_bytes(), "bad".into(), "bad.csv").unwrap_err();
        assert!(matches!(err, CycleLoadError::NegativeSpeed { index: 1, .. }));
    }

    #[cfg(feature = "resources")]
    #[test]
    fn test_loading_standard_cycles_by_name() {
        for name in ["udds", "hwfet", "us06"] {
            let cyc = Cycle::from_resource(name).unwrap();
            assert_eq!(cyc.name, name);
            assert!(cyc.len() > 100);
        }
        assert!(matches!(
            Cycle::from_resource("nycc"),
            Err(CycleLoadError::UnknownName { .. })
        ));
    }
}
