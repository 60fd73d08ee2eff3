#[quarry::database]
pub mod shop {
    use quarry::{MemoryCursor, RowCount, RowStream};
    use std::collections::{BTreeMap, HashMap};

    #[table("customer")]
    #[derive(Clone, Debug)]
    pub struct Customer {
        pub id: i64,
        #[column("display_name")]
        pub name: String,
        #[relation(parent = "id", entity = "customer_id")]
        pub orders: Vec<Order>,
    }

    #[table("purchase")]
    #[derive(Clone, Debug)]
    pub struct Order {
        pub id: i64,
        pub customer_id: i64,
        pub total: f64,
        pub note: Option<String>,
    }

    #[query("SELECT * FROM customer WHERE id = $1")]
    pub fn customer(id: i64) -> Customer;

    #[query("SELECT * FROM customer WHERE display_name = $1")]
    pub fn customer_named(name: &str) -> Option<Customer>;

    #[query("SELECT * FROM purchase WHERE total > $1")]
    pub fn large_orders(min_total: f64) -> Vec<Order>;

    #[query("SELECT * FROM customer", key = "id")]
    pub fn customers_by_id() -> HashMap<i64, Customer>;

    #[query("SELECT customer_id, id FROM purchase", key = "customer_id", value = "id")]
    pub fn order_ids() -> BTreeMap<i64, Vec<i64>>;

    #[query("SELECT * FROM purchase")]
    pub fn order_stream() -> RowStream<Order>;

    #[query("SELECT * FROM purchase")]
    pub fn order_count() -> RowCount;

    #[query("SELECT * FROM purchase")]
    pub fn raw_orders() -> MemoryCursor;

    #[query("SELECT avatar FROM customer WHERE id = $1")]
    pub fn avatar(id: i64) -> Vec<u8>;

    pub fn helper() -> &'static str {
        CUSTOMER_QUERY.sql
    }
}

fn main() {
    assert!(shop::CUSTOMER_QUERY.copies_cursor);
    assert!(!shop::LARGE_ORDERS_QUERY.copies_cursor);
    assert_eq!(shop::CUSTOMERS_BY_ID_QUERY.relation_tables, &["purchase"]);
    assert_eq!(shop::Order::TABLE_NAME, "purchase");
    assert_eq!(shop::helper(), "SELECT * FROM customer WHERE id = $1");
}
