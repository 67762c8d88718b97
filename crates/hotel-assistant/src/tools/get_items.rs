use std::sync::Arc;

use hotel_assistant_core::tool::{Tool, ToolResult};
use hotel_assistant_inventory::{InventoryBackend, ItemQuery};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::execution_error;

/// Parameters of [`GetItemsTool`].
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetItemsParameters {
    #[schemars(description = "Comma separated list of item ids to fetch")]
    ids: Option<String>,
    #[schemars(
        description = "Comma separated list of item categories to fetch"
    )]
    categories: Option<String>,
}

/// A tool for looking up items in the inventory.
pub struct GetItemsTool {
    inventory: Arc<dyn InventoryBackend>,
    parameter_schema: Value,
}

impl GetItemsTool {
    /// Creates a new tool over `inventory`.
    #[inline]
    pub fn new(inventory: Arc<dyn InventoryBackend>) -> Self {
        Self {
            inventory,
            parameter_schema: schema_for!(GetItemsParameters).to_value(),
        }
    }
}

impl Tool for GetItemsTool {
    type Input = GetItemsParameters;

    fn name(&self) -> &str {
        "get_items"
    }

    fn description(&self) -> &str {
        "Get a list of items from the database"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: GetItemsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let inventory = Arc::clone(&self.inventory);
        let query = ItemQuery::from_csv(
            input.ids.as_deref(),
            input.categories.as_deref(),
        );
        async move {
            let items =
                inventory.get_items(&query).await.map_err(execution_error)?;
            serde_json::to_value(items).map_err(execution_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use hotel_assistant_inventory::MemoryInventory;
    use serde_json::json;

    use super::*;

    async fn get_items(arguments: Value) -> Value {
        let tool = GetItemsTool::new(Arc::new(MemoryInventory::seeded()));
        let input = serde_json::from_value(arguments).unwrap();
        tool.execute(input).await.unwrap()
    }

    fn ids(items: &Value) -> Vec<u64> {
        items
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_by_ids() {
        let items = get_items(json!({ "ids": "1,2" })).await;
        assert_eq!(ids(&items), vec![1, 2]);
        assert_eq!(
            items[0],
            json!({
                "id": 1,
                "name_en": "Water",
                "name_cn": "水",
                "category": "Food and beverages",
                "price": 1.0,
                "quantity": 100,
            })
        );
    }

    #[tokio::test]
    async fn test_by_category() {
        let items = get_items(json!({ "categories": "Miscellaneous" })).await;
        assert_eq!(ids(&items), vec![5, 6]);
    }

    #[tokio::test]
    async fn test_without_filter() {
        let items = get_items(json!({})).await;
        assert_eq!(ids(&items), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_schema() {
        let tool = GetItemsTool::new(Arc::new(MemoryInventory::seeded()));
        let schema = tool.parameter_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["ids"].is_object());
        assert!(schema["properties"]["categories"].is_object());
    }
}
