pub mod knowledge;
pub mod not_found;
