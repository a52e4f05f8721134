pub mod energy;
pub mod outcome;
