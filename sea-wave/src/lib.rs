//! Special functions and analytical solutions for the Helmholtz equation
//!
//! - **Special functions**: spherical Bessel/Hankel, Legendre, complex
//!   spherical harmonics with Wigner rotations, outgoing multipole fields
//! - **Green's functions**: the 3D Helmholtz kernel and its derivatives
//! - **Analytical solutions**: free-field monopole, rigid and admittance sphere scattering
//!   (modal series and Rayleigh limit) for validating the BEM solver
//!
//! # Example
//!
//! ```rust
//! use sea_wave::analytical::rigid_sphere_scattered;
//! use std::f64::consts::PI;
//!
//! let p = rigid_sphere_scattered(1.0, 1.0, 2.0, PI / 2.0, 20);
//! assert!(p.norm() > 0.0);
//! ```

pub mod analytical;
pub mod special;

pub use analytical::{AnalyticalSolution, Point};
