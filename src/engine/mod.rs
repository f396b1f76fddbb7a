// Engine modules: input binding pipeline and tick timing

pub mod input;
pub mod tick;
