//! Physical and numerical constants

use std::f64::consts::PI;

/// 4π
pub const PI4: f64 = 4.0 * PI;

/// 2π
pub const PI2: f64 = 2.0 * PI;

/// Default speed of sound in air (m/s)
pub const DEFAULT_SPEED_OF_SOUND: f64 = 343.0;

/// Default air density (kg/m³)
pub const DEFAULT_DENSITY: f64 = 1.21;

/// Default temperature (°C)
pub const DEFAULT_TEMPERATURE: f64 = 20.0;

/// Default relative humidity (%)
pub const DEFAULT_HUMIDITY: f64 = 50.0;

/// Default atmospheric pressure (Pa)
pub const DEFAULT_ATMOSPHERIC_PRESSURE: f64 = 101325.0;

/// Reference sound power (W) for levels in dB re 1 pW
pub const REFERENCE_POWER: f64 = 1e-12;

/// Reference sound pressure (Pa) for levels in dB SPL
pub const REFERENCE_PRESSURE: f64 = 20e-6;

/// Pairs closer than this many element diameters use singular quadrature
pub const NEAR_FIELD_FACTOR: f64 = 1.5;

/// Relative GMRES tolerance of the boundary solve
pub const SOLVER_TOLERANCE: f64 = 1e-5;

/// Dynamic viscosity of air (Pa·s) used by the panel models
pub const AIR_VISCOSITY: f64 = 1.8e-5;

/// Small epsilon for geometric comparisons
pub const EPSY: f64 = 1.0e-14;
