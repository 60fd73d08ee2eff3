use futures_util::StreamExt;
use parking_lot::Mutex;
use quarry::relation::{Junction, RelationQuery, KEY_COLUMN};
use quarry::*;

#[quarry::database]
pub mod library {
    use quarry::{MemoryCursor, RowCount, RowStream};
    use std::collections::{BTreeMap, HashMap};

    #[table("author")]
    #[derive(Clone, Debug, PartialEq)]
    pub struct Author {
        pub id: i64,
        #[column("full_name")]
        pub name: String,
        #[relation(parent = "id", entity = "author_id")]
        pub books: Vec<Book>,
    }

    #[table("book")]
    #[derive(Clone, Debug, PartialEq)]
    pub struct Book {
        pub id: i64,
        pub author_id: i64,
        pub title: String,
    }

    #[table("tag")]
    #[derive(Clone, Debug, PartialEq)]
    pub struct Tag {
        pub id: i64,
        pub label: String,
    }

    #[table("author")]
    #[derive(Clone, Debug, PartialEq)]
    pub struct Byline {
        pub id: i64,
        #[column("full_name")]
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub struct TaggedBook {
        pub id: i64,
        pub author_id: i64,
        pub title: String,
        #[relation(
            parent = "id",
            entity = "id",
            junction(table = "book_tag", parent = "book_id", entity = "tag_id")
        )]
        pub tags: Vec<Tag>,
        #[relation(parent = "author_id", entity = "id")]
        pub byline: Option<Byline>,
    }

    #[query("SELECT count(*) FROM book")]
    pub fn book_count() -> i64;

    #[query("SELECT * FROM book WHERE id = $1")]
    pub fn book(id: i64) -> Book;

    #[query("SELECT * FROM book WHERE id = $1")]
    pub fn find_book(id: i64) -> Option<Book>;

    /// NULL and no row at all are both `None`.
    #[query("SELECT subtitle FROM book WHERE id = $1")]
    pub fn subtitle(id: i64) -> Option<String>;

    #[query("SELECT * FROM author")]
    pub fn authors() -> Vec<Author>;

    #[query("SELECT * FROM author", key = "id")]
    pub fn authors_by_id() -> HashMap<i64, Author>;

    #[query("SELECT * FROM book", key = "id", value = "title")]
    pub fn titles() -> BTreeMap<i64, String>;

    #[query("SELECT author.id, book.title FROM author LEFT JOIN book", key = "id", value = "title")]
    pub fn titles_by_author() -> BTreeMap<i64, Vec<String>>;

    #[query("SELECT * FROM book")]
    pub fn book_stream() -> RowStream<Book>;

    #[query("SELECT * FROM book")]
    pub fn book_rows() -> RowCount;

    #[query("SELECT * FROM book")]
    pub fn raw_books() -> MemoryCursor;

    #[query("SELECT * FROM book")]
    pub fn tagged_books() -> Vec<TaggedBook>;
}

/// Answers each SQL string with a canned cursor and records what was asked.
#[derive(Default)]
struct FakeDb {
    responses: Vec<(String, MemoryCursor)>,
    log: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeDb {
    fn respond(mut self, sql: impl Into<String>, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let columns = columns.iter().map(|column| column.to_string()).collect();
        let cursor = MemoryCursor::from_rows(columns, rows).unwrap();
        self.responses.push((sql.into(), cursor));
        self
    }

    fn queries(&self) -> Vec<String> {
        self.log.lock().iter().map(|(sql, _)| sql.clone()).collect()
    }
}

#[async_trait]
impl Connection for FakeDb {
    async fn query(&self, sql: &str, args: &[Value]) -> QuarryResult<Box<dyn Cursor + Send>> {
        self.log.lock().push((sql.to_owned(), args.to_vec()));

        self.responses
            .iter()
            .find(|(candidate, _)| candidate == sql)
            .map(|(_, cursor)| Box::new(cursor.clone()) as Box<dyn Cursor + Send>)
            .ok_or_else(|| QuarryError::Database(format!("unexpected query: {}", sql)))
    }
}

const BOOKS_OF_AUTHORS: RelationQuery = RelationQuery {
    table: "book",
    entity_column: "author_id",
    junction: None,
};

fn text(value: &str) -> Value {
    Value::Text(value.to_owned())
}

fn book_rows() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Integer(1), Value::Integer(10), text("Dune")],
        vec![Value::Integer(2), Value::Integer(10), text("Children of Dune")],
        vec![Value::Integer(3), Value::Integer(20), text("Solaris")],
    ]
}

fn books_db() -> FakeDb {
    FakeDb::default().respond("SELECT * FROM book", &["id", "author_id", "title"], book_rows())
}

fn authors_db() -> FakeDb {
    let relation_sql = BOOKS_OF_AUTHORS.sql(&FakeDb::default(), 3);

    FakeDb::default()
        .respond(
            "SELECT * FROM author",
            &["id", "full_name"],
            vec![
                vec![Value::Integer(10), text("Frank Herbert")],
                vec![Value::Integer(20), text("Stanisław Lem")],
                vec![Value::Integer(30), text("Nobody")],
            ],
        )
        .respond(
            relation_sql,
            &[KEY_COLUMN, "id", "author_id", "title"],
            book_rows()
                .into_iter()
                .map(|row| {
                    let mut keyed = vec![row[1].clone()];
                    keyed.extend(row);
                    keyed
                })
                .collect(),
        )
}

fn book(id: i64, author_id: i64, title: &str) -> library::Book {
    library::Book {
        id,
        author_id,
        title: title.to_owned(),
    }
}

#[tokio::test]
async fn scalar_single() {
    let db = FakeDb::default().respond(
        "SELECT count(*) FROM book",
        &["count"],
        vec![vec![Value::Integer(3)]],
    );

    assert_eq!(library::book_count(&db).await.unwrap(), 3);
    assert!(!library::BOOK_COUNT_QUERY.copies_cursor);
    assert!(library::BOOK_COUNT_QUERY.relation_tables.is_empty());
}

#[tokio::test]
async fn single_entity_binds_arguments() {
    let db = FakeDb::default().respond(
        "SELECT * FROM book WHERE id = $1",
        &["id", "author_id", "title"],
        vec![vec![Value::Integer(3), Value::Integer(20), text("Solaris")]],
    );

    assert_eq!(library::book(&db, 3).await.unwrap(), book(3, 20, "Solaris"));
    assert_eq!(
        db.log.lock()[0],
        ("SELECT * FROM book WHERE id = $1".to_owned(), vec![Value::Integer(3)])
    );
}

#[tokio::test]
async fn single_requires_a_row() {
    let db = FakeDb::default().respond(
        "SELECT * FROM book WHERE id = $1",
        &["id", "author_id", "title"],
        vec![],
    );

    let error = library::book(&db, 4).await.unwrap_err();
    assert!(matches!(error, QuarryError::EmptyResult { expected: "Book" }));

    assert_eq!(library::find_book(&db, 4).await.unwrap(), None);
}

#[tokio::test]
async fn nullable_scalar() {
    let sql = "SELECT subtitle FROM book WHERE id = $1";

    let db = FakeDb::default().respond(sql, &["subtitle"], vec![vec![Value::Null]]);
    assert_eq!(library::subtitle(&db, 1).await.unwrap(), None);

    let db = FakeDb::default().respond(sql, &["subtitle"], vec![]);
    assert_eq!(library::subtitle(&db, 1).await.unwrap(), None);

    let db = FakeDb::default().respond(sql, &["subtitle"], vec![vec![text("Part one")]]);
    assert_eq!(
        library::subtitle(&db, 1).await.unwrap(),
        Some("Part one".to_owned())
    );
}

/// Answers every query with an empty Postgres result for the book columns.
#[cfg(feature = "postgres")]
struct EmptyPostgres;

#[cfg(feature = "postgres")]
#[async_trait]
impl Connection for EmptyPostgres {
    async fn query(&self, _: &str, _: &[Value]) -> QuarryResult<Box<dyn Cursor + Send>> {
        let columns = vec!["id".into(), "author_id".into(), "title".into()];
        Ok(Box::new(quarry::database::postgres::rows_to_cursor(
            columns,
            &[],
        )?))
    }
}

#[cfg(feature = "postgres")]
#[tokio::test]
async fn empty_postgres_results() {
    let db = EmptyPostgres;

    assert_eq!(library::find_book(&db, 1).await.unwrap(), None);
    assert!(library::tagged_books(&db).await.unwrap().is_empty());

    let error = library::book(&db, 1).await.unwrap_err();
    assert!(matches!(error, QuarryError::EmptyResult { expected: "Book" }));
}

#[tokio::test]
async fn relations_are_hydrated() {
    let db = authors_db();
    let authors = library::authors(&db).await.unwrap();

    assert_eq!(
        authors
            .iter()
            .map(|author| (author.name.as_str(), author.books.len()))
            .collect::<Vec<_>>(),
        vec![("Frank Herbert", 2), ("Stanisław Lem", 1), ("Nobody", 0)]
    );
    assert_eq!(
        authors[0].books,
        vec![book(1, 10, "Dune"), book(2, 10, "Children of Dune")]
    );

    // One primary query, one relation query for all parents.
    assert_eq!(db.queries().len(), 2);
    assert_eq!(
        db.log.lock()[1].1,
        vec![Value::Integer(10), Value::Integer(20), Value::Integer(30)]
    );

    assert!(library::AUTHORS_QUERY.copies_cursor);
    assert_eq!(library::AUTHORS_QUERY.relation_tables, &["book"]);
}

#[tokio::test]
async fn map_values_are_hydrated() {
    let db = authors_db();
    let authors = library::authors_by_id(&db).await.unwrap();

    assert_eq!(authors.len(), 3);
    assert_eq!(authors[&20].books, vec![book(3, 20, "Solaris")]);
    assert!(library::AUTHORS_BY_ID_QUERY.copies_cursor);
}

#[tokio::test]
async fn map_keeps_first_row_per_key() {
    let db = FakeDb::default().respond(
        "SELECT * FROM book",
        &["id", "author_id", "title"],
        vec![
            vec![Value::Integer(1), Value::Integer(10), text("first")],
            vec![Value::Integer(1), Value::Integer(10), text("second")],
            vec![Value::Integer(2), Value::Integer(10), text("other")],
        ],
    );

    let titles = library::titles(&db).await.unwrap();
    assert_eq!(
        titles.into_iter().collect::<Vec<_>>(),
        vec![(1, "first".to_owned()), (2, "other".to_owned())]
    );
}

#[tokio::test]
async fn multimap_groups_rows() {
    let db = FakeDb::default().respond(
        "SELECT author.id, book.title FROM author LEFT JOIN book",
        &["id", "title"],
        vec![
            vec![Value::Integer(10), text("Dune")],
            vec![Value::Integer(20), text("Solaris")],
            vec![Value::Integer(10), text("Children of Dune")],
            vec![Value::Integer(30), Value::Null],
        ],
    );

    let grouped = library::titles_by_author(&db).await.unwrap();
    assert_eq!(grouped[&10], vec!["Dune".to_owned(), "Children of Dune".to_owned()]);
    assert_eq!(grouped[&20], vec!["Solaris".to_owned()]);
    assert!(grouped[&30].is_empty());
}

#[tokio::test]
async fn stream_count_and_cursor() {
    let db = books_db();

    let titles: Vec<String> = library::book_stream(&db)
        .await
        .unwrap()
        .map(|book| book.title)
        .collect()
        .await;
    assert_eq!(titles, vec!["Dune", "Children of Dune", "Solaris"]);

    assert_eq!(library::book_rows(&db).await.unwrap(), RowCount(3));

    let mut raw = library::raw_books(&db).await.unwrap();
    assert_eq!(raw.len(), 3);
    assert!(raw.move_to_next());
    assert_eq!(raw.get::<String>(2).unwrap(), "Dune");
}

#[tokio::test]
async fn junction_and_optional_relations() {
    let tags = RelationQuery {
        table: "tag",
        entity_column: "id",
        junction: Some(Junction {
            table: "book_tag",
            parent_column: "book_id",
            entity_column: "tag_id",
        }),
    };
    let bylines = RelationQuery {
        table: "author",
        entity_column: "id",
        junction: None,
    };
    let sql_db = FakeDb::default();

    let db = books_db()
        .respond(
            tags.sql(&sql_db, 3),
            &[KEY_COLUMN, "id", "label"],
            vec![
                vec![Value::Integer(1), Value::Integer(100), text("classic")],
                vec![Value::Integer(3), Value::Integer(100), text("classic")],
                vec![Value::Integer(3), Value::Integer(200), text("translated")],
            ],
        )
        .respond(
            bylines.sql(&sql_db, 2),
            &[KEY_COLUMN, "id", "full_name"],
            vec![vec![Value::Integer(20), Value::Integer(20), text("Stanisław Lem")]],
        );

    let books = library::tagged_books(&db).await.unwrap();

    assert_eq!(books[0].tags.len(), 1);
    assert!(books[1].tags.is_empty());
    assert_eq!(
        books[2]
            .tags
            .iter()
            .map(|tag| tag.label.as_str())
            .collect::<Vec<_>>(),
        vec!["classic", "translated"]
    );

    assert_eq!(books[0].byline, None);
    assert_eq!(
        books[2].byline.as_ref().map(|byline| byline.name.as_str()),
        Some("Stanisław Lem")
    );

    assert_eq!(
        library::TAGGED_BOOKS_QUERY.relation_tables,
        &["author", "book_tag", "tag"]
    );
}

#[tokio::test]
async fn relation_failures_name_the_table() {
    let db = FakeDb::default().respond(
        "SELECT * FROM author",
        &["id", "full_name"],
        vec![vec![Value::Integer(10), text("Frank Herbert")]],
    );

    let error = library::authors(&db).await.unwrap_err();
    assert!(matches!(error, QuarryError::Relation { table, .. } if table == "book"));
}

#[tokio::test]
async fn tracker_observes_relation_tables() {
    let tracker = InvalidationTracker::new();
    let observation = tracker.observe_query(&library::AUTHORS_QUERY, &["author"]);

    assert!(!observation.is_stale());
    tracker.notify("book");
    assert!(observation.is_stale());
}

#[test]
fn table_names() {
    assert_eq!(library::Author::TABLE_NAME, "author");
    assert_eq!(library::Book::TABLE_NAME, "book");
}
