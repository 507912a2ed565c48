pub mod finance;
pub mod product;
pub mod transformation;
pub mod user;
