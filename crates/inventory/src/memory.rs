use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{InventoryBackend, InventoryError, Item, ItemQuery};

/// An inventory kept in memory.
///
/// Filters behave like the inventory API, so this store can stand in for
/// it in offline runs and tests.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    items: Mutex<Vec<Item>>,
}

impl MemoryInventory {
    /// Creates a store holding `items`, in that order.
    #[inline]
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Creates a store holding the hotel's initial stock.
    pub fn seeded() -> Self {
        let food = "Food and beverages";
        let misc = "Miscellaneous";
        let items = [
            ("Water", "水", food, 1.0, 100),
            ("Coca-cola", "可樂", food, 2.0, 200),
            ("Hamburger", "漢堡包", food, 13.0, 0),
            ("Fried rice", "炒飯", food, 9.0, 300),
            ("Newspaper", "報紙", misc, 2.0, 100),
            ("Cigarettes", "煙", misc, 5.0, 100),
        ];
        let items = items
            .into_iter()
            .zip(1..)
            .map(|((name_en, name_cn, category, price, quantity), id)| Item {
                id,
                name_en: name_en.to_owned(),
                name_cn: name_cn.to_owned(),
                category: category.to_owned(),
                price,
                quantity,
            })
            .collect();
        Self::with_items(items)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Item>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl InventoryBackend for MemoryInventory {
    async fn categories(&self) -> Result<Vec<String>, InventoryError> {
        let mut categories: Vec<String> = vec![];
        for item in self.lock().iter() {
            if !categories.contains(&item.category) {
                categories.push(item.category.clone());
            }
        }
        Ok(categories)
    }

    async fn get_items(
        &self,
        query: &ItemQuery,
    ) -> Result<Vec<Item>, InventoryError> {
        let items = self.lock();
        Ok(items
            .iter()
            .filter(|item| query.matches(item))
            .cloned()
            .collect())
    }

    async fn purchase(
        &self,
        id: u64,
        quantity: i64,
    ) -> Result<Item, InventoryError> {
        let mut items = self.lock();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(InventoryError::NotFound(id))?;
        item.quantity = item
            .quantity
            .checked_sub(quantity)
            .ok_or(InventoryError::QuantityOverflow { id, quantity })?;
        debug!("item {id} purchased, {} left", item.quantity);
        Ok(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[Item]) -> Vec<u64> {
        items.iter().map(|item| item.id).collect()
    }

    #[tokio::test]
    async fn test_get_items_by_ids() {
        let inventory = MemoryInventory::seeded();
        let items = inventory
            .get_items(&ItemQuery::from_csv(Some("2,1"), None))
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![1, 2]);
        assert_eq!(items[0].name_en, "Water");
        assert_eq!(items[0].name_cn, "水");
        assert_eq!(items[1].price, 2.0);
    }

    #[tokio::test]
    async fn test_get_items_by_category() {
        let inventory = MemoryInventory::seeded();
        let items = inventory
            .get_items(&ItemQuery::from_csv(None, Some("Miscellaneous")))
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![5, 6]);
        assert!(items.iter().all(|item| item.category == "Miscellaneous"));
    }

    #[tokio::test]
    async fn test_get_items_filters() {
        let inventory = MemoryInventory::seeded();

        let all = inventory.get_items(&ItemQuery::All).await.unwrap();
        assert_eq!(ids(&all), vec![1, 2, 3, 4, 5, 6]);

        // Ids win over categories.
        let query = ItemQuery::from_csv(Some("3"), Some("Miscellaneous"));
        let items = inventory.get_items(&query).await.unwrap();
        assert_eq!(ids(&items), vec![3]);

        let query = ItemQuery::from_csv(Some("water"), None);
        assert!(inventory.get_items(&query).await.unwrap().is_empty());

        let query = ItemQuery::from_csv(None, Some("Spa"));
        assert!(inventory.get_items(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories() {
        let inventory = MemoryInventory::seeded();
        assert_eq!(
            inventory.categories().await.unwrap(),
            vec!["Food and beverages", "Miscellaneous"]
        );
        assert!(
            MemoryInventory::default()
                .categories()
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_purchase_has_no_lower_bound() {
        let inventory = MemoryInventory::seeded();
        let item = inventory.purchase(1, 5).await.unwrap();
        assert_eq!(item.quantity, 95);
        let item = inventory.purchase(1, 96).await.unwrap();
        assert_eq!(item.quantity, -1);

        let items = inventory.get_items(&ItemQuery::Ids(vec![1])).await;
        assert_eq!(items.unwrap()[0].quantity, -1);
    }

    #[tokio::test]
    async fn test_purchase_quantity_overflow() {
        let inventory = MemoryInventory::seeded();
        let err = inventory.purchase(1, i64::MIN).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::QuantityOverflow {
                id: 1,
                quantity: i64::MIN,
            }
        ));

        // The stock is left untouched.
        let items = inventory.get_items(&ItemQuery::Ids(vec![1])).await;
        assert_eq!(items.unwrap()[0].quantity, 100);
    }

    #[tokio::test]
    async fn test_purchase_unknown_item() {
        let inventory = MemoryInventory::seeded();
        let err = inventory.purchase(42, 1).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(42)));
    }
}
