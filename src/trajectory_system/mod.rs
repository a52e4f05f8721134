pub mod dynamics;
pub mod integrator;
pub mod trajectory;
