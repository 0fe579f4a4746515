//! Post-processing of boundary solutions

pub mod pressure;

pub use pressure::{evaluate_field_point, layer_potentials, scattered_pressure, spl_db, FieldPoint};
