//! Value Objects - Immutable catalog vocabulary

mod part_color;
mod part_model;

pub use part_color::PartColor;
pub use part_model::PartModel;
