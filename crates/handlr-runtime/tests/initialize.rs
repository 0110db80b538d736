//! Bootstrap behavior of `Handlr::initialize`.

use handlr_config::RuntimeMode;
use handlr_core::{HandlrError, Value};
use handlr_middleware::{BoxedMiddleware, FnMiddleware, MiddlewareEntry, Reply, RequestData};
use handlr_runtime::{Entry, FnInitializer, Handlr, HandlerDefinition, RegistryError};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;

fn mark(name: &'static str) -> MiddlewareEntry {
    MiddlewareEntry::from_fn(name, move |_ctx, data, next| {
        Box::pin(async move {
            if let Some(Value::Array(seen)) = data.input.get_mut("seen") {
                seen.push(json!(name));
            } else {
                data.input.insert("seen".into(), json!([name]));
            }
            next.run(data).await
        })
    })
}

fn seen_by_handler(name: &str) -> HandlerDefinition {
    HandlerDefinition::from_fn(name, |_ctx, input| {
        Box::pin(async move { Ok(Reply::new(input.get("seen").cloned().unwrap_or(Value::Null))) })
    })
    .input(["seen"])
}

#[tokio::test]
async fn test_dev_handler_skipped_in_production() {
    let mut app = Handlr::with_mode(RuntimeMode::Production);
    app.handler([seen_by_handler("live"), seen_by_handler("debug").dev()]).unwrap();

    let ctx = app.initialize().await.unwrap();
    assert!(ctx.has_handler("live"));
    assert!(!ctx.has_handler("debug"));
    assert!(ctx.call("debug", &mut RequestData::default()).await.is_none());
}

#[tokio::test]
async fn test_dev_handler_installed_in_development() {
    let mut app = Handlr::with_mode(RuntimeMode::Development);
    app.handler([seen_by_handler("debug").dev()]).unwrap();

    let ctx = app.initialize().await.unwrap();
    assert!(ctx.has_handler("debug"));
}

#[tokio::test]
async fn test_global_priority_and_local_order() {
    let mut app = Handlr::with_mode(RuntimeMode::Development);
    app.middleware([
        mark("twenty").global().priority(20),
        mark("default").global(),
        mark("ten").global().priority(10),
        mark("local"),
    ])
    .unwrap();
    app.handler([Entry::try_factory(|registry| {
        Ok(seen_by_handler("ordered").middleware(registry.require("local", &Value::Null)?))
    })])
    .unwrap();

    let ctx = app.initialize().await.unwrap();
    let installed = ctx.handler("ordered").unwrap();
    assert_eq!(installed.stage_names(), vec!["ten", "twenty", "default", "local", "core"]);

    let outcome = ctx.call("ordered", &mut RequestData::default()).await.unwrap();
    assert_eq!(outcome.response, json!(["ten", "twenty", "default", "local"]));
}

#[tokio::test]
async fn test_repeated_initialize_is_stable() {
    let mut app = Handlr::with_mode(RuntimeMode::Development);
    app.middleware([mark("a").global().priority(5), mark("b").global().priority(5), mark("c").global()])
        .unwrap();
    app.handler([seen_by_handler("h")]).unwrap();

    let first = app.initialize().await.unwrap();
    let second = app.initialize().await.unwrap();

    assert_eq!(
        first.handler("h").unwrap().stage_names(),
        second.handler("h").unwrap().stage_names()
    );
    assert_eq!(first.handler("h").unwrap().stage_names(), vec!["a", "b", "c", "core"]);
}

#[tokio::test]
async fn test_duplicate_handler_rejected() {
    let mut app = Handlr::with_mode(RuntimeMode::Development);
    let err = app
        .handler([seen_by_handler("same"), seen_by_handler("same")])
        .unwrap_err();

    assert_eq!(err, RegistryError::DuplicateHandler("same".into()));
    assert_eq!(app.registry().handler_names().collect::<Vec<_>>(), vec!["same"]);
}

#[tokio::test]
async fn test_initializers_run_before_handlers() {
    struct Pool {
        size: u64,
    }

    let mut app = Handlr::with_mode(RuntimeMode::Development);
    app.set("pool.size", 4);
    app.initializer([Entry::initializer(FnInitializer::new("pool", |ctx| {
        Box::pin(async move {
            let size = ctx.settings().get_as::<u64>("pool.size")?.unwrap_or(1);
            ctx.extensions_mut().insert(Pool { size });
            ctx.settings_mut().set("pool.ready", true);
            Ok(())
        })
    }))])
    .unwrap();
    app.handler([HandlerDefinition::from_fn("pool.size", |ctx, _input| {
        Box::pin(async move {
            let pool = ctx.extension::<Pool>().ok_or_else(|| HandlrError::value("pool missing"))?;
            Ok(Reply::new(json!({ "size": pool.size, "ready": ctx.settings().get("pool.ready") })))
        })
    })])
    .unwrap();

    let ctx = app.initialize().await.unwrap();
    let outcome = ctx.call("pool.size", &mut RequestData::default()).await.unwrap();

    assert_eq!(outcome.response, json!({ "size": 4, "ready": true }));
    assert_eq!(app.get("pool.ready"), None);
}

#[tokio::test]
async fn test_failing_initializer_aborts() {
    let mut app = Handlr::with_mode(RuntimeMode::Development);
    app.initializer([Entry::initializer(FnInitializer::new("broken", |_ctx| {
        Box::pin(async { Err(HandlrError::value("cannot connect")) })
    }))])
    .unwrap();
    app.handler([seen_by_handler("h")]).unwrap();

    let err = app.initialize().await.unwrap_err();
    assert_eq!(err.to_string(), "cannot connect");
}

#[tokio::test]
async fn test_generator_specializes_local_middleware() {
    let role_guard = mark("guard").generate(|options| {
        let role = options.get("role")?.as_str()?.to_string();
        Some(Arc::new(FnMiddleware::new(format!("guard:{role}"), move |_ctx, data, next| {
            let role = role.clone();
            Box::pin(async move {
                if data.input.get("role").and_then(Value::as_str) == Some(role.as_str()) {
                    next.run(data).await
                } else {
                    Err(HandlrError::forbidden(format!("requires {role}")))
                }
            })
        })) as BoxedMiddleware)
    });

    let mut app = Handlr::with_mode(RuntimeMode::Development);
    app.middleware([role_guard]).unwrap();
    app.handler([Entry::try_factory(|registry| {
        Ok(HandlerDefinition::from_fn("admin.only", |_ctx, _input| {
            Box::pin(async { Ok(Reply::new(json!("welcome"))) })
        })
        .middleware(registry.require("guard", &json!({ "role": "admin" }))?))
    })])
    .unwrap();

    let ctx = app.initialize().await.unwrap();
    assert_eq!(ctx.handler("admin.only").unwrap().stage_names(), vec!["guard:admin", "core"]);

    let denied = ctx
        .call("admin.only", &mut RequestData::from_value(json!({ "role": "user" })))
        .await
        .unwrap();
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.error.unwrap().message, "requires admin");

    let allowed = ctx
        .call("admin.only", &mut RequestData::from_value(json!({ "role": "admin" })))
        .await
        .unwrap();
    assert_eq!(allowed.response, json!("welcome"));
}

#[tokio::test]
async fn test_malformed_schema_fails_initialize() {
    let mut app = Handlr::with_mode(RuntimeMode::Development);
    let description = handlr_schema::SchemaDescription::from_value(&json!({ "a": { "required": true } })).unwrap();
    app.handler([seen_by_handler("ok").input(description)]).unwrap();
    assert!(app.initialize().await.is_ok());

    let both = handlr_schema::SchemaDescription::new().field(
        "x",
        handlr_schema::FieldDef::new()
            .properties(["y"])
            .array(handlr_schema::FieldDef::new()),
    );
    app.handler([seen_by_handler("bad").input(both)]).unwrap();
    assert!(app.initialize().await.is_err());
}
