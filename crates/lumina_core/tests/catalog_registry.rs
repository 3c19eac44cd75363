use chrono::NaiveDate;
use lumina_core::db::open_db_in_memory;
use lumina_core::{
    BookListQuery, CatalogError, CatalogService, MemberListQuery, MemberService,
    MemberServiceError, MemberStatus, MembershipType, NewBook, NewMember, RepoError,
    SqliteBookRepository, SqliteMemberRepository,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_book(title: &str, category: &str, quantity: u32) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        isbn: "978-0441172719".to_string(),
        category: category.to_string(),
        quantity,
        cover_url: None,
        owner_account: None,
    }
}

fn new_member(name: &str, email: &str) -> NewMember {
    NewMember {
        name: name.to_string(),
        email: email.to_string(),
        phone: "555-0100".to_string(),
        membership_type: MembershipType::Student,
        account_uuid: None,
    }
}

#[test]
fn added_book_starts_fully_available_with_stock_cover() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteBookRepository::new(&conn));

    let book = catalog.add_book(new_book("Dune", "Fiction", 3)).unwrap();
    assert_eq!(book.quantity, 3);
    assert_eq!(book.available, 3);
    assert!(book.cover_url.is_some());
}

#[test]
fn explicit_cover_url_is_kept() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteBookRepository::new(&conn));

    let mut input = new_book("Dune", "Fiction", 1);
    input.cover_url = Some("https://covers.example.com/dune.jpg".to_string());
    let book = catalog.add_book(input).unwrap();
    assert_eq!(
        book.cover_url.as_deref(),
        Some("https://covers.example.com/dune.jpg")
    );
}

#[test]
fn update_rejects_available_above_quantity() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteBookRepository::new(&conn));

    let mut book = catalog.add_book(new_book("Dune", "Fiction", 2)).unwrap();
    book.available = 5;

    let err = catalog.update_book(&book).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Repo(RepoError::Validation(_))
    ));
}

#[test]
fn update_unknown_book_fails_not_found() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteBookRepository::new(&conn));

    let mut book = catalog.add_book(new_book("Dune", "Fiction", 1)).unwrap();
    catalog.remove_book(book.uuid).unwrap();

    book.title = "Dune Messiah".to_string();
    let err = catalog.update_book(&book).unwrap_err();
    assert!(matches!(err, CatalogError::BookNotFound(id) if id == book.uuid));
}

#[test]
fn list_filters_by_category() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteBookRepository::new(&conn));

    catalog.add_book(new_book("Dune", "Fiction", 1)).unwrap();
    catalog.add_book(new_book("Cosmos", "Science", 1)).unwrap();

    let fiction = catalog
        .list_books(&BookListQuery {
            category: Some("Fiction".to_string()),
            ..BookListQuery::default()
        })
        .unwrap();
    assert_eq!(fiction.len(), 1);
    assert_eq!(fiction[0].title, "Dune");

    let all = catalog.list_books(&BookListQuery::default()).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn removing_a_book_hard_deletes_it() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteBookRepository::new(&conn));

    let book = catalog.add_book(new_book("Dune", "Fiction", 1)).unwrap();
    catalog.remove_book(book.uuid).unwrap();

    assert!(catalog.get_book(book.uuid).unwrap().is_none());

    let err = catalog.remove_book(book.uuid).unwrap_err();
    assert!(matches!(err, CatalogError::BookNotFound(id) if id == book.uuid));
}

#[test]
fn registered_member_starts_active_with_stock_avatar() {
    let conn = open_db_in_memory().unwrap();
    let registry = MemberService::new(SqliteMemberRepository::new(&conn));

    let member = registry
        .register_member(new_member("Ada Lovelace", "ada@example.com"), date(2024, 3, 1))
        .unwrap();
    assert_eq!(member.status, MemberStatus::Active);
    assert_eq!(member.join_date, date(2024, 3, 1));
    assert!(member.avatar_url.is_some());
}

#[test]
fn member_status_toggles_between_active_and_inactive() {
    let conn = open_db_in_memory().unwrap();
    let registry = MemberService::new(SqliteMemberRepository::new(&conn));

    let member = registry
        .register_member(new_member("Ada Lovelace", "ada@example.com"), date(2024, 3, 1))
        .unwrap();

    let inactive = registry
        .set_member_status(member.uuid, MemberStatus::Inactive)
        .unwrap();
    assert_eq!(inactive.status, MemberStatus::Inactive);

    let active = registry
        .set_member_status(member.uuid, MemberStatus::Active)
        .unwrap();
    assert_eq!(active.status, MemberStatus::Active);
}

#[test]
fn list_filters_by_member_status() {
    let conn = open_db_in_memory().unwrap();
    let registry = MemberService::new(SqliteMemberRepository::new(&conn));

    let ada = registry
        .register_member(new_member("Ada Lovelace", "ada@example.com"), date(2024, 3, 1))
        .unwrap();
    registry
        .register_member(new_member("Grace Hopper", "grace@example.com"), date(2024, 3, 2))
        .unwrap();
    registry
        .set_member_status(ada.uuid, MemberStatus::Inactive)
        .unwrap();

    let inactive = registry
        .list_members(&MemberListQuery {
            status: Some(MemberStatus::Inactive),
            ..MemberListQuery::default()
        })
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].uuid, ada.uuid);
}

#[test]
fn removing_unknown_member_fails_not_found() {
    let conn = open_db_in_memory().unwrap();
    let registry = MemberService::new(SqliteMemberRepository::new(&conn));

    let missing = Uuid::new_v4();
    let err = registry.remove_member(missing).unwrap_err();
    assert!(matches!(err, MemberServiceError::MemberNotFound(id) if id == missing));
}

#[test]
fn duplicate_member_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let registry = MemberService::new(SqliteMemberRepository::new(&conn));

    registry
        .register_member(new_member("Ada Lovelace", "ada@example.com"), date(2024, 3, 1))
        .unwrap();
    let err = registry
        .register_member(new_member("Ada Clone", "ada@example.com"), date(2024, 3, 2))
        .unwrap_err();
    assert!(matches!(err, MemberServiceError::Repo(RepoError::Db(_))));
}
