//! Plan renderers: CSV table, shopping list and text guide

pub mod guide;
pub mod shopping;
pub mod table;

pub use guide::render_guide;
pub use shopping::{shopping_list, write_shopping_csv, ShoppingItem};
pub use table::{materials_text, render_plan_csv, write_plan_csv, PLAN_HEADER};
