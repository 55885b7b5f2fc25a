//! Precedence and degradation tests: admin-over-remote, local-over-remote,
//! settings kill-switch, and remote store outages.

use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn admin_rule_removes_same_id_remote_rule_entirely() {
    let (store_base, store) = common::start_mock_store().await;

    let mut config = common::test_config(&store_base);
    config.rules = vec![common::rule(json!({
        "handler": "helloWorld",
        "match": { "path": "secure" },
        "admin": true
    }))];

    // A remote rule for the same handler id with no secret requirement. If
    // precedence filtering failed, a wrong secret would fall through to it.
    store.put(
        "config",
        "rules",
        json!({
            "helloWorld": { "handler": "helloWorld", "match": { "path": "secure" } }
        }),
    );

    let (base, shutdown) = common::start_gateway(config).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{base}/secure"))
        .json(&json!({ "auth_code": "WRONG" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404, "wrong secret must not fall through");

    let res = client
        .post(format!("{base}/secure"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404, "missing secret must not fall through");

    let res = client
        .post(format!("{base}/secure"))
        .json(&json!({ "auth_code": "S3CR3T" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
}

#[tokio::test]
async fn trusted_local_handler_shadows_remote_code() {
    let (store_base, store) = common::start_mock_store().await;

    // Remote code claims the builtin's id; it must never load.
    store.put(
        "handlers",
        "helloWorld",
        json!({
            "handler_id": "helloWorld",
            "code": common::encode_source(
                "fn handleHelloWorld(req, vars) { #{ status: 200, body: #{ message: \"impostor\" } } }"
            ),
        }),
    );

    let mut config = common::test_config(&store_base);
    config.rules = vec![common::rule(json!({
        "handler": "helloWorld",
        "match": { "path": "hello" }
    }))];

    let (base, shutdown) = common::start_gateway(config).await;

    let res = reqwest::Client::new()
        .get(format!("{base}/hello"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Hello world!");

    assert_eq!(
        store.get_count("handlers", "helloWorld"),
        0,
        "local units resolve without touching the code store"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn settings_document_pins_rule_source_to_local() {
    let (store_base, store) = common::start_mock_store().await;

    store.put("config", "settings", json!({ "source": "local" }));
    store.put(
        "config",
        "rules",
        json!({
            "remoteOnly": { "handler": "helloWorld", "match": { "path": "remote-only" } }
        }),
    );

    let mut config = common::test_config(&store_base);
    config.rules = vec![common::rule(json!({
        "handler": "helloWorld",
        "match": { "path": "hello" }
    }))];

    let (base, shutdown) = common::start_gateway(config).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{base}/hello")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("{base}/remote-only"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404, "remote rules are pinned off");

    shutdown.trigger();
}

#[tokio::test]
async fn remote_store_outage_leaves_admin_rules_serving() {
    // Nothing listens here; every store call fails.
    let mut config = common::test_config("http://127.0.0.1:9");
    config.rules.push(common::rule(json!({
        "handler": "helloWorld",
        "match": { "path": "hello" }
    })));

    let (base, shutdown) = common::start_gateway(config).await;
    let client = reqwest::Client::new();

    // Admin rules resolve from the trusted registry and keep working.
    let res = client
        .post(format!("{base}/status"))
        .json(&json!({ "auth_code": "S3CR3T" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");

    // Non-admin bootstrap rules are remote-sourced in this mode and degrade
    // away with the outage.
    let res = client.get(format!("{base}/hello")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn first_matching_rule_wins_across_the_merged_set() {
    let (store_base, store) = common::start_mock_store().await;

    store.put(
        "handlers",
        "second",
        json!({
            "handler_id": "second",
            "code": common::encode_source(
                "fn handleSecond(req, vars) { #{ status: 200, body: #{ source: \"remote\" } } }"
            ),
        }),
    );
    // Both remote rules match /overlap; ids order them ("aaa" before "zzz"),
    // and the bootstrap rule outranks both.
    store.put(
        "config",
        "rules",
        json!({
            "aaa": { "handler": "second", "match": { "path": "overlap" } },
            "zzz": { "handler": "second", "match": { "path": "overlap" } }
        }),
    );

    let mut config = common::test_config(&store_base);
    config.rules = vec![common::rule(json!({
        "handler": "helloWorld",
        "match": { "path": "overlap" },
        "admin": true
    }))];

    let (base, shutdown) = common::start_gateway(config).await;
    let client = reqwest::Client::new();

    // With the secret, the admin rule (first in the set) wins.
    let res = client
        .post(format!("{base}/overlap"))
        .json(&json!({ "auth_code": "S3CR3T" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Hello world!");

    // Without it, the admin rule mismatches and the first remote rule runs.
    let res = client.get(format!("{base}/overlap")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["source"], "remote");

    shutdown.trigger();
}
