use hotel_assistant_inventory::{
    HttpInventory, InventoryBackend, InventoryError, ItemQuery,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn newspaper(quantity: i64) -> serde_json::Value {
    json!({
        "id": 5,
        "name_en": "Newspaper",
        "name_cn": "報紙",
        "category": "Miscellaneous",
        "price": 2.0,
        "quantity": quantity,
    })
}

#[tokio::test]
async fn test_categories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/category"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["Food and beverages", "Miscellaneous"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let inventory = HttpInventory::new(&server.uri()).unwrap();
    assert_eq!(
        inventory.categories().await.unwrap(),
        vec!["Food and beverages", "Miscellaneous"]
    );
}

#[tokio::test]
async fn test_get_items_sends_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", "5,6"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([newspaper(100)])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("category", "Miscellaneous"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let inventory = HttpInventory::new(&format!("{}/", server.uri())).unwrap();
    let items = inventory
        .get_items(&ItemQuery::from_csv(Some("5, 6"), Some("Food")))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name_cn, "報紙");

    let items = inventory
        .get_items(&ItemQuery::from_csv(None, Some("Miscellaneous")))
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_unparsable_ids_skip_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let inventory = HttpInventory::new(&server.uri()).unwrap();
    let items = inventory
        .get_items(&ItemQuery::from_csv(Some("water"), None))
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_purchase() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/item/purchase"))
        .and(body_json(json!({ "id": 5, "quantity": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(newspaper(97)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/item/purchase"))
        .and(body_json(json!({ "id": 42, "quantity": 1 })))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let inventory = HttpInventory::new(&server.uri()).unwrap();
    let item = inventory.purchase(5, 3).await.unwrap();
    assert_eq!(item.quantity, 97);

    let err = inventory.purchase(42, 1).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(42)));
}

#[tokio::test]
async fn test_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/category"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let inventory = HttpInventory::new(&server.uri()).unwrap();
    let err = inventory.categories().await.unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Status { status: 500, ref body } if body == "boom"
    ));
}

#[test]
fn test_invalid_base_url() {
    let err = HttpInventory::new("not a url").unwrap_err();
    assert!(matches!(err, InventoryError::InvalidUrl(_)));
}
