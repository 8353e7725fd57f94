pub mod garch;

pub use arch_test::{arch_lm_test, ArchLmResult};
pub use garch::{GarchFit, GarchParams, MeanModel};
