//! Leaf text-analysis components. Everything here is pure and synchronous;
//! the only model-backed input (NER entities) is passed in by the caller.

pub mod contact;
pub mod dates;
pub mod entries;
pub mod normalize;
pub mod sections;
pub mod skills;
