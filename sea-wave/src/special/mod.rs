//! Special functions for wave equations
//!
//! - Spherical Bessel functions (jₙ, yₙ) and Hankel functions hₙ⁽¹⁾
//! - Legendre polynomials Pₙ and associated functions Pₙᵐ
//! - Complex spherical harmonics Yₙᵐ, Wigner rotations, outgoing multipole
//!   fields
//! - The 3D Helmholtz Green's function

pub mod harmonics;
pub mod helmholtz;
mod legendre;
pub mod spherical;

pub use harmonics::*;
pub use helmholtz::*;
pub use legendre::*;
pub use spherical::*;
