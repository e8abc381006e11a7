mod common;

use barbarian::game::{ScriptedRolls, ShopError};
use barbarian::server::{ActionError, AuthError};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[tokio::test]
async fn adventure_persists_items_but_not_gold() {
    let tmp = tempfile::tempdir().unwrap();
    let actions = common::torch_actions(tmp.path());
    actions.create_account("conan", "cimmeria123").await.unwrap();

    let login = actions.login("conan", "cimmeria123").await.unwrap();
    let mut rolls = ScriptedRolls::new(vec![10, 3, 0]);
    let out = actions.do_adventure(&login.token, &mut rolls).await.unwrap();
    assert_eq!(out.earnings(), (10, 3));
    assert_eq!(out.item.as_deref(), Some("torch"));

    let stored = actions.store().find_by_username("conan").unwrap().unwrap();
    assert_eq!(stored.items, vec!["torch".to_string()]);

    assert!(actions.logout(&login.token).await);
    let again = actions.login("conan", "cimmeria123").await.unwrap();
    let state = actions.state(&again.token).await.unwrap();
    assert_eq!((state.gold, state.experience, state.level), (0, 0, 1));
    assert_eq!(state.items, vec!["torch".to_string()]);
}

#[tokio::test]
async fn login_failures_are_distinguished() {
    let tmp = tempfile::tempdir().unwrap();
    let actions = common::torch_actions(tmp.path());
    let id = actions.create_account("conan", "cimmeria123").await.unwrap();

    assert_eq!(actions.authenticate("conan", "cimmeria123").await.unwrap(), id);
    assert!(matches!(
        actions.authenticate("thulsa", "cimmeria123").await,
        Err(AuthError::UnknownUser)
    ));
    let err = actions.login("conan", "wrongpass1").await.unwrap_err();
    assert!(matches!(err, AuthError::BadPassword));
    assert_eq!(err.to_string(), "Please check your login details and try again.");
    assert_eq!(actions.active_sessions().await, 0);
}

#[tokio::test]
async fn duplicate_usernames_are_refused() {
    let tmp = tempfile::tempdir().unwrap();
    let actions = common::torch_actions(tmp.path());
    actions.create_account("Conan", "cimmeria123").await.unwrap();
    let err = actions.create_account("conan", "another123").await.unwrap_err();
    assert!(err.is_user_error());
    let err = actions.create_account("valeria", "short").await.unwrap_err();
    assert!(err.is_user_error());
}

#[tokio::test]
async fn buying_a_sword_spends_gold_and_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let actions = common::torch_actions(tmp.path());
    actions.create_account("conan", "cimmeria123").await.unwrap();
    let login = actions.login("conan", "cimmeria123").await.unwrap();

    // seven adventures at 15 gold each
    let mut rolls = ScriptedRolls::new([15u64, 1, 0].repeat(7));
    for _ in 0..7 {
        actions.do_adventure(&login.token, &mut rolls).await.unwrap();
    }
    assert_eq!(actions.state(&login.token).await.unwrap().gold, 105);

    let purchase = actions.buy(&login.token, "basic_sword").await.unwrap();
    assert_eq!(purchase.price, 100);
    assert_eq!(purchase.message, "Bought a basic sword!");

    let state = actions.state(&login.token).await.unwrap();
    assert_eq!(state.gold, 5);
    assert!(state.has_item("basic_sword"));
    let stored = actions.store().find_by_username("conan").unwrap().unwrap();
    assert_eq!(stored.items.last().map(String::as_str), Some("basic_sword"));

    let err = actions.buy(&login.token, "basic_sword").await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Shop(ShopError::InsufficientGold { price: 100, gold: 5, .. })
    ));
    let err = actions.buy(&login.token, "dragon_egg").await.unwrap_err();
    assert!(matches!(err, ActionError::Shop(ShopError::UnknownItem(_))));
    assert_eq!(actions.state(&login.token).await.unwrap().gold, 5);

    // the sword now pays +5 on every adventure
    let mut rolls = ScriptedRolls::new(vec![10, 1, 0]);
    let out = actions.do_adventure(&login.token, &mut rolls).await.unwrap();
    assert_eq!(out.gold_earned, 15);
}

#[tokio::test]
async fn polling_catches_up_only_in_auto_mode() {
    let tmp = tempfile::tempdir().unwrap();
    let actions = common::torch_actions(tmp.path());
    actions.create_account("conan", "cimmeria123").await.unwrap();
    let login = actions.login("conan", "cimmeria123").await.unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let t0 = Utc::now();

    let idle = actions.poll(&login.token, t0 + Duration::seconds(60), &mut rng).await.unwrap();
    assert_eq!(idle.gold, 0);

    assert!(actions.toggle_auto(&login.token, t0).await.unwrap());
    let later = t0 + Duration::seconds(27);
    let state = actions.poll(&login.token, later, &mut rng).await.unwrap();
    assert_eq!(state.items.len(), 5);
    assert!((25..=75).contains(&state.gold));
    assert_eq!(state.last_adventure_time, later);

    let same = actions.poll(&login.token, later, &mut rng).await.unwrap();
    assert_eq!(same, state);

    // catch-up progress stays in the session
    let stored = actions.store().find_by_username("conan").unwrap().unwrap();
    assert!(stored.items.is_empty());

    assert!(!actions.toggle_auto(&login.token, later).await.unwrap());
    let off = actions
        .poll(&login.token, later + Duration::seconds(500), &mut rng)
        .await
        .unwrap();
    assert_eq!(off.gold, state.gold);
}

#[tokio::test]
async fn explicit_catch_up_reports_what_it_ran() {
    let tmp = tempfile::tempdir().unwrap();
    let actions = common::torch_actions(tmp.path());
    actions.create_account("conan", "cimmeria123").await.unwrap();
    let login = actions.login("conan", "cimmeria123").await.unwrap();
    let start = actions.state(&login.token).await.unwrap().last_adventure_time;

    let mut rolls = ScriptedRolls::new([5u64, 5, 0].repeat(3));
    let report = actions
        .do_catch_up(&login.token, start + Duration::seconds(16), &mut rolls)
        .await
        .unwrap();
    assert_eq!(report.adventures, 3);
    assert_eq!(report.gold_earned, 15);
    assert_eq!(report.xp_earned, 15);
    assert_eq!(report.levels_gained, 1);
    assert_eq!(report.items_found.len(), 3);

    let state = actions.state(&login.token).await.unwrap();
    assert_eq!((state.level, state.experience), (2, 5));
}

#[tokio::test]
async fn unknown_session_is_a_missing_player() {
    let tmp = tempfile::tempdir().unwrap();
    let actions = common::torch_actions(tmp.path());
    let mut rng = StdRng::seed_from_u64(1);
    let bogus = "550e8400-e29b-41d4-a716-446655440000";

    let err = actions.do_adventure(bogus, &mut rng).await.unwrap_err();
    assert!(matches!(err, ActionError::MissingPlayer));
    assert_eq!(err.to_string(), "Error: Player's id could not be found.");
    assert!(matches!(
        actions.buy(bogus, "basic_sword").await,
        Err(ActionError::MissingPlayer)
    ));
    assert!(matches!(
        actions.toggle_auto(bogus, Utc::now()).await,
        Err(ActionError::MissingPlayer)
    ));

    actions.create_account("conan", "cimmeria123").await.unwrap();
    let login = actions.login("conan", "cimmeria123").await.unwrap();
    actions.logout(&login.token).await;
    assert!(matches!(
        actions.do_adventure(&login.token, &mut rng).await,
        Err(ActionError::MissingPlayer)
    ));
}
