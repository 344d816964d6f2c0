pub mod factory;
pub mod tests;
