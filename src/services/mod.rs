pub mod accessor;
pub mod providers;

pub use accessor::ModelAccessor;
