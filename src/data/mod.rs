pub mod candidate;
pub mod catalog;
pub mod quota;
pub mod roster;
pub mod validate;
