pub mod atmosphere;
pub mod density_table;
pub mod planet;
