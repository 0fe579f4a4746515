//! Surface mesh, triangle geometry and the P1 space

pub mod element;
pub mod space;
pub mod surface;

pub use element::Triangle;
pub use space::P1Space;
pub use surface::SurfaceMesh;
