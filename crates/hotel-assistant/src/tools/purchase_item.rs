use std::sync::Arc;

use hotel_assistant_core::tool::{Error as ToolError, Tool, ToolResult};
use hotel_assistant_inventory::InventoryBackend;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::execution_error;

/// Parameters of [`PurchaseItemTool`].
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PurchaseItemParameters {
    #[schemars(
        description = "The given product ID, product name is not accepted \
                       here. Please obtain the product ID from the database \
                       first."
    )]
    id: String,
    #[schemars(description = "Number of items to purchase")]
    quantity: i64,
}

/// A tool for buying items.
///
/// The stock is deducted without checking it, so a large order leaves a
/// negative quantity behind.
pub struct PurchaseItemTool {
    inventory: Arc<dyn InventoryBackend>,
    parameter_schema: Value,
}

impl PurchaseItemTool {
    /// Creates a new tool over `inventory`.
    #[inline]
    pub fn new(inventory: Arc<dyn InventoryBackend>) -> Self {
        Self {
            inventory,
            parameter_schema: schema_for!(PurchaseItemParameters).to_value(),
        }
    }
}

impl Tool for PurchaseItemTool {
    type Input = PurchaseItemParameters;

    fn name(&self) -> &str {
        "purchase_item"
    }

    fn description(&self) -> &str {
        "Purchase a particular item"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: PurchaseItemParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let inventory = Arc::clone(&self.inventory);
        async move {
            let Ok(id) = input.id.trim().parse::<u64>() else {
                return Err(ToolError::invalid_arguments().with_reason(
                    format!("`{}` is not an item id", input.id),
                ));
            };
            let item = inventory
                .purchase(id, input.quantity)
                .await
                .map_err(execution_error)?;
            serde_json::to_value(item).map_err(execution_error)
        }
    }
}
