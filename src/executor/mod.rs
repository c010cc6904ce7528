pub mod predicate;
pub mod select;
