//! The tools the hotel assistant offers to the model.

mod brochure;
mod get_items;
mod purchase_item;

use std::fmt::Display;

use hotel_assistant_core::tool::Error as ToolError;

pub use brochure::{BrochureParameters, BrochureTool};
pub use get_items::{GetItemsParameters, GetItemsTool};
pub use purchase_item::{PurchaseItemParameters, PurchaseItemTool};

#[inline]
fn execution_error(err: impl Display) -> ToolError {
    ToolError::execution_error().with_reason(err.to_string())
}
