mod rt {
    pub use quarry::*;
}

#[quarry::database(runtime = "crate::rt")]
mod counters {
    #[query("SELECT count(*) FROM visit WHERE page = $1")]
    pub fn visits(page: String) -> i64;

    #[query("SELECT max(at) FROM visit")]
    pub fn last_visit() -> Option<i64>;
}

fn main() {
    assert_eq!(counters::VISITS_QUERY.name, "visits");
    assert!(counters::LAST_VISIT_QUERY.relation_tables.is_empty());
}
