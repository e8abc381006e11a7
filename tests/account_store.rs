mod common;

use barbarian::storage::{AccountStore, StoreError};

#[test]
fn passwords_verify() {
    let tmpdir = tempfile::tempdir().unwrap();
    let store = common::fast_store(tmpdir.path());
    let account = store.register_user("alice", "initialPass1").unwrap();

    let (found, ok) = store.verify_user_password("alice", "initialPass1").unwrap();
    assert!(ok, "initial password should verify");
    assert_eq!(found.unwrap().id, account.id);
    let (_u2, ok2) = store.verify_user_password("ALICE", "initialPass1").unwrap();
    assert!(ok2, "name lookup is case-insensitive");
    let (_u3, bad) = store.verify_user_password("alice", "NewPassw0rd!").unwrap();
    assert!(!bad, "wrong password should fail");

    let (none, ok) = store.verify_user_password("bob", "whatever12").unwrap();
    assert!(none.is_none() && !ok);
}

#[test]
fn items_survive_reopen() {
    let tmpdir = tempfile::tempdir().unwrap();
    let id = {
        let store = common::fast_store(tmpdir.path());
        let account = store.register_user("conan", "cimmeria123").unwrap();
        store
            .save_items(&account.id, &["torch".to_string(), "basic_sword".to_string()])
            .unwrap();
        account.id
    };

    let store = AccountStore::open(tmpdir.path().join("accounts")).unwrap();
    let account = store.get_account(&id).unwrap();
    assert_eq!(account.items, vec!["torch", "basic_sword"]);
    let stats = store.statistics().unwrap();
    assert_eq!(stats.total_accounts, 1);
    assert_eq!(stats.total_items, 2);
}

#[test]
fn bad_registrations_are_user_errors() {
    let tmpdir = tempfile::tempdir().unwrap();
    let store = common::fast_store(tmpdir.path());
    store.register_user("conan", "cimmeria123").unwrap();

    for (name, pass) in [("Conan", "cimmeria123"), ("x", "cimmeria123"), ("admin", "cimmeria123"), ("bêlit", "short")] {
        let err = store.register_user(name, pass).unwrap_err();
        assert!(err.is_user_error(), "{name}: {err}");
    }
    assert!(matches!(
        store.register_user("CONAN", "cimmeria123"),
        Err(StoreError::UsernameTaken(_))
    ));
    assert!(matches!(store.get_account("missing"), Err(StoreError::NotFound(_))));
    assert_eq!(store.list_accounts().unwrap().len(), 1);
}
