//! A small application assembled through the facade.

use handlr::prelude::*;
use serde_json::json;

fn positive() -> Predicate {
    Predicate::new(|v| v.as_f64().is_some_and(|n| n > 0.0))
}

fn app() -> Handlr {
    let mut app = Handlr::with_mode(RuntimeMode::Production);
    app.set("orders.currency", "EUR");

    app.middleware([MiddlewareEntry::from_fn("tenant", |_ctx, data, next| {
        Box::pin(async move {
            if data.input.get("tenant").is_none() {
                return Err(HandlrError::authentication("missing tenant"));
            }
            next.run(data).await
        })
    })
    .global()
    .priority(1)])
    .unwrap();

    let line = SchemaDescription::new()
        .field("sku", FieldDef::new().required())
        .field("quantity", FieldDef::new().required().validator((positive(), "must be positive")));

    let order = SchemaDescription::new()
        .field("tenant", FieldDef::new().required())
        .field("customer.email", FieldDef::new().required_with("email is required"))
        .field("lines", FieldDef::new().required().array(FieldDef::new().properties(line)))
        .field(
            "note",
            FieldDef::new().formatter(Formatter::new(|v| json!(v.as_str().unwrap_or_default().to_uppercase()))),
        );

    app.handler([
        HandlerDefinition::from_fn("orders.create", |ctx, input| {
            Box::pin(async move {
                let currency = ctx.settings().get("orders.currency").cloned().unwrap_or(Value::Null);
                let count = input["lines"].as_array().map_or(0, Vec::len);
                Ok(Reply::new(json!({ "lines": count, "currency": currency, "note": input.get("note") }))
                    .with_status(StatusCode::CREATED))
            })
        })
        .input(order),
        HandlerDefinition::from_fn("orders.debug", |_ctx, _input| {
            Box::pin(async { Ok(Reply::new(json!("debug"))) })
        })
        .dev(),
    ])
    .unwrap();

    app
}

#[tokio::test]
async fn test_valid_order() {
    let ctx = app().initialize().await.unwrap();
    let mut data = RequestData::from_value(json!({
        "tenant": "acme",
        "customer": { "email": "ada@example.com" },
        "lines": [{ "sku": "A-1", "quantity": 2 }, { "sku": "B-2", "quantity": 1, "gift": true }],
        "note": "leave at door",
    }));

    let outcome = ctx.call("orders.create", &mut data).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.status, StatusCode::CREATED);
    assert_eq!(outcome.response, json!({ "lines": 2, "currency": "EUR", "note": "LEAVE AT DOOR" }));
    assert_eq!(data.input["lines"][1], json!({ "sku": "B-2", "quantity": 1 }));
    assert_eq!(data.input["note"], json!("LEAVE AT DOOR"));
}

#[tokio::test]
async fn test_invalid_order_reports_every_field() {
    let ctx = app().initialize().await.unwrap();
    let mut data = RequestData::from_value(json!({
        "tenant": "acme",
        "lines": [{ "sku": "A-1", "quantity": -2 }],
    }));

    let outcome = ctx.call("orders.create", &mut data).await.unwrap();

    assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
    let error = outcome.error.unwrap();
    assert_eq!(error.name, "validation_error");
    assert_eq!(error.message, "Input values do not conform to the expected schema");
    assert_eq!(
        error.cause,
        Some(json!({ "customer.email": "email is required", "lines": "invalid" }))
    );
    assert_eq!(outcome.response, json!({}));
}

#[tokio::test]
async fn test_global_middleware_rejects_before_sanitizing() {
    let ctx = app().initialize().await.unwrap();
    let mut data = RequestData::from_value(json!({ "lines": "not a list" }));

    let outcome = ctx.call("orders.create", &mut data).await.unwrap();

    assert_eq!(outcome.status, StatusCode::UNAUTHORIZED);
    assert_eq!(outcome.error.unwrap().name, "authentication_error");
}

#[tokio::test]
async fn test_production_hides_dev_handlers() {
    let ctx = app().initialize().await.unwrap();
    assert_eq!(ctx.handler_names().collect::<Vec<_>>(), vec!["orders.create"]);
}
