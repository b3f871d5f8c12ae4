use orderdesk_core::db::open_db_in_memory;
use orderdesk_core::{
    Customer, CustomerRepository, ErrorKind, RepoError, SqliteCustomerRepository, ValidationError,
};

fn full_customer(name: &str, email: &str) -> Customer {
    Customer {
        id: None,
        name: name.to_string(),
        email: email.to_string(),
        phone: "+55 11 5555-0101".to_string(),
        address: "Rua A, 10".to_string(),
        city: "Sao Paulo".to_string(),
        region: "SP".to_string(),
        country: "Brazil".to_string(),
    }
}

#[test]
fn create_and_get_roundtrip_assigns_positive_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);

    let created = repo
        .create_customer(&full_customer("Ana", "ana@x.com"))
        .unwrap();
    let id = created.id.unwrap();
    assert!(id > 0);

    let loaded = repo.get_customer(id).unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.name, "Ana");
    assert_eq!(loaded.email, "ana@x.com");
    assert_eq!(loaded.phone, "+55 11 5555-0101");
    assert_eq!(loaded.address, "Rua A, 10");
    assert_eq!(loaded.city, "Sao Paulo");
    assert_eq!(loaded.region, "SP");
    assert_eq!(loaded.country, "Brazil");
}

#[test]
fn create_with_duplicate_email_fails_and_keeps_original() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);
    let original = repo
        .create_customer(&full_customer("Ana", "ana@x.com"))
        .unwrap();

    let err = repo
        .create_customer(&full_customer("Impostor", "ana@x.com"))
        .unwrap_err();
    assert!(matches!(
        &err,
        RepoError::DuplicateKey { entity: "customer", field: "email", value } if value == "ana@x.com"
    ));
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);

    let all = repo.list_customers().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, original.id);
    assert_eq!(all[0].name, "Ana");
}

#[test]
fn lookups_return_none_when_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);

    assert!(repo.get_customer(42).unwrap().is_none());
    assert!(repo.get_customer_by_email("nobody@x.com").unwrap().is_none());
}

#[test]
fn get_by_email_finds_created_customer() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);
    let created = repo
        .create_customer(&Customer::new("Bea", "bea@x.com"))
        .unwrap();

    let found = repo.get_customer_by_email("bea@x.com").unwrap().unwrap();
    assert_eq!(found, created);
}

#[test]
fn update_replaces_fields_and_reports_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);
    let mut customer = repo
        .create_customer(&full_customer("Ana", "ana@x.com"))
        .unwrap();

    customer.name = "Ana Maria".to_string();
    customer.city = "Recife".to_string();
    assert!(repo.update_customer(&customer).unwrap());

    let loaded = repo.get_customer(customer.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.name, "Ana Maria");
    assert_eq!(loaded.city, "Recife");

    let mut ghost = Customer::new("Ghost", "ghost@x.com");
    ghost.id = Some(999);
    assert!(!repo.update_customer(&ghost).unwrap());
}

#[test]
fn update_to_taken_email_is_duplicate_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);
    repo.create_customer(&Customer::new("Ana", "ana@x.com"))
        .unwrap();
    let mut bea = repo
        .create_customer(&Customer::new("Bea", "bea@x.com"))
        .unwrap();

    bea.email = "ana@x.com".to_string();
    let err = repo.update_customer(&bea).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);

    let stored = repo.get_customer(bea.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.email, "bea@x.com");
}

#[test]
fn validation_failure_blocks_writes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);

    let err = repo
        .create_customer(&Customer::new("  ", "ana@x.com"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyField {
            entity: "customer",
            field: "name"
        })
    ));

    let err = repo
        .update_customer(&Customer::new("Ana", "ana@x.com"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::Unsaved("customer"))
    ));
    assert!(repo.list_customers().unwrap().is_empty());
}

#[test]
fn delete_is_mechanical_and_reports_affected_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);
    let created = repo
        .create_customer(&Customer::new("Ana", "ana@x.com"))
        .unwrap();
    let id = created.id.unwrap();

    assert!(repo.delete_customer(id).unwrap());
    assert!(!repo.delete_customer(id).unwrap());
    assert!(repo.get_customer(id).unwrap().is_none());
}

#[test]
fn list_returns_customers_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);
    for (name, email) in [("Ana", "ana@x.com"), ("Bea", "bea@x.com"), ("Caio", "caio@x.com")] {
        repo.create_customer(&Customer::new(name, email)).unwrap();
    }

    let names: Vec<String> = repo
        .list_customers()
        .unwrap()
        .into_iter()
        .map(|customer| customer.name)
        .collect();
    assert_eq!(names, ["Ana", "Bea", "Caio"]);
}

#[test]
fn email_whitespace_does_not_bypass_uniqueness() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::new(&conn);

    let created = repo
        .create_customer(&Customer::new("Ana", "  ana@x.com "))
        .unwrap();
    assert_eq!(created.email, "ana@x.com");
    let stored = repo.get_customer(created.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.email, "ana@x.com");

    let err = repo
        .create_customer(&Customer::new("Impostor", "ana@x.com "))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);

    let mut bea = repo
        .create_customer(&Customer::new("Bea", "bea@x.com"))
        .unwrap();
    bea.email = " ana@x.com".to_string();
    assert_eq!(
        repo.update_customer(&bea).unwrap_err().kind(),
        ErrorKind::DuplicateKey
    );

    assert!(repo.get_customer_by_email(" ana@x.com ").unwrap().is_some());
    assert_eq!(repo.list_customers().unwrap().len(), 2);
}
