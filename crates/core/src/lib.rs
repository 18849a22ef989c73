#![forbid(unsafe_code)]

pub mod cursor;
pub mod model;

pub use cursor::{DrawPlan, plan_draw};
