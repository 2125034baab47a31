#![cfg(target_arch = "wasm32")]

use lifegoal_game::{KeyValueStore, StorageFeature, storage_key};
use lifegoal_web::{LifeGoalApp, LocalStorageStore, dom};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn dom_helpers_find_local_storage() {
    assert!(dom::window().is_some());
    assert!(dom::local_storage().is_ok());
}

#[wasm_bindgen_test]
fn console_logger_installs_once() {
    dom::install_console_logger(log::LevelFilter::Debug);
    dom::install_console_logger(log::LevelFilter::Error);
    assert_ne!(log::max_level(), log::LevelFilter::Off);
    log::warn!("console logger smoke test");
}

#[wasm_bindgen_test]
fn local_storage_store_round_trips_values() {
    let store = LocalStorageStore::new().unwrap();
    store.set_item("lifegoal.test.key", "42").unwrap();
    assert_eq!(
        store.get_item("lifegoal.test.key").unwrap().as_deref(),
        Some("42")
    );
    store.remove_item("lifegoal.test.key").unwrap();
    assert_eq!(store.get_item("lifegoal.test.key").unwrap(), None);
}

#[wasm_bindgen_test]
fn app_persists_through_local_storage() {
    let app = LifeGoalApp::new("wasm-user", JsValue::UNDEFINED).unwrap();
    app.reset_user();
    assert_eq!(app.credit("dice", 2, "test").unwrap(), 2.0);
    let store = LocalStorageStore::new().unwrap();
    let raw = store
        .get_item(&storage_key(StorageFeature::Currency, "wasm-user"))
        .unwrap()
        .unwrap();
    assert!(raw.contains("\"dice\":2"));
    assert!(app.spend("hearts", 1, "too much").is_err());
    app.reset_user();
}
