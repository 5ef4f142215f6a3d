pub mod mapping;
#[cfg(feature = "ultralive")]
pub mod ultralive;
