//! Integration tests for core-async on WASM platforms.

#![cfg(target_arch = "wasm32")]

use core_async::{task, time};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    assert_eq!(handle.await.unwrap(), 42);
}

#[wasm_bindgen_test]
async fn test_sleep_then_spawn() {
    let handle = task::spawn(async {
        time::sleep(time::Duration::from_millis(10)).await;
        "done"
    });
    assert_eq!(handle.await.unwrap(), "done");
}
