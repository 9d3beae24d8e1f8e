//! Module containing physical constants and unit conversions.

/// Unit conversions that should NEVER change
pub const J_PER_KWH: f64 = 3.6e6;
pub const W_PER_KW: f64 = 1e3;
pub const M_PER_KM: f64 = 1e3;
pub const S_PER_HR: f64 = 3.6e3;

/// Sea level air density at approximately 20C, $\frac{kg}{m^3}$
pub const AIR_DENSITY_KG_PER_M3: f64 = 1.2;
/// Gravitational acceleration, $\frac{m}{s^2}$
pub const A_GRAV_MPS2: f64 = 9.81;
