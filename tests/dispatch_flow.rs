//! Integration tests for command registration and dispatch.

mod common;

use bytes::Bytes;
use chrono::Utc;
use command_hub::config::RegistryConfig;
use command_hub::{
    CaseMode, CommandEntry, CommandError, CommandHandler, DefaultRequest, Origin, Registry,
    RequestContext, handler_fn,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A transport request type with its own fields.
struct HttpRequest {
    vars: command_hub::Vars,
    body: Vec<u8>,
    headers: HashMap<String, String>,
}

impl RequestContext for HttpRequest {
    fn vars(&self) -> Option<&command_hub::Vars> {
        Some(&self.vars)
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.body)
    }

    fn set_response_timestamp(&mut self, at: chrono::DateTime<Utc>) {
        self.headers.insert("date".into(), at.to_rfc2822());
    }
}

/// A request type that offers no capabilities at all.
struct RawFrame;

impl RequestContext for RawFrame {}

struct UserAgent;

#[async_trait]
impl CommandHandler for UserAgent {
    async fn handle(
        &self,
        _entry: &CommandEntry,
        _origin: Origin,
        request: &mut dyn RequestContext,
    ) -> Result<Bytes, CommandError> {
        let http = request.downcast_ref::<HttpRequest>()?;
        let agent = http.headers.get("user-agent").cloned().unwrap_or_default();
        request.set_response_timestamp(Utc::now());
        Ok(Bytes::from(agent))
    }
}

fn registry() -> Registry {
    let registry = Registry::new();
    registry
        .add(
            CommandEntry::new("user", Origin::HTTP | Origin::WS)
                .with_params("{id}/{field}")
                .with_description("Read one field of a user")
                .with_handler(handler_fn(|_, _, req| {
                    let id = req.param("id")?;
                    let field = req.param("field")?;
                    Ok(Bytes::from(format!("{id}.{field}")))
                })),
        )
        .unwrap()
        .add(
            CommandEntry::new("agent", Origin::HTTP)
                .with_handler(UserAgent),
        )
        .unwrap();
    registry
}

#[tokio::test]
async fn test_line_dispatch_binds_positional_params() {
    let registry = registry();
    let reply = registry
        .dispatch_line(b"user/42/email", Origin::WS)
        .await
        .unwrap();
    assert_eq!(&reply[..], b"42.email");
}

#[tokio::test]
async fn test_last_slot_swallows_rest() {
    let registry = registry();
    registry
        .add(
            CommandEntry::new("put", Origin::ALL)
                .with_params("{key}")
                .with_handler(handler_fn(|_, _, req| {
                    let key = req.param("key")?.to_string();
                    let body = req.try_data()?.to_vec();
                    Ok(Bytes::from(format!("{key}={}", String::from_utf8_lossy(&body))))
                })),
        )
        .unwrap();

    let reply = registry
        .dispatch_line(b"put/path/a/b/c", Origin::TEONET)
        .await
        .unwrap();
    assert_eq!(&reply[..], b"path=a/b/c");
}

#[tokio::test]
async fn test_unknown_command_short_circuits() {
    let registry = registry();
    assert!(matches!(
        registry.parse_command(b"missing/1/2"),
        Err(CommandError::NotFound(_))
    ));
    let mut req = DefaultRequest::default();
    assert!(matches!(
        registry.exec("missing", Origin::ALL, &mut req).await,
        Err(CommandError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_transport_request_reaches_handler() {
    let registry = registry();
    let mut req = HttpRequest {
        vars: Default::default(),
        body: Vec::new(),
        headers: HashMap::from([("user-agent".to_string(), "curl/8".to_string())]),
    };

    let reply = registry.exec("agent", Origin::HTTP, &mut req).await.unwrap();
    assert_eq!(&reply[..], b"curl/8");
    assert!(req.headers.contains_key("date"));
}

#[tokio::test]
async fn test_incompatible_request_is_incorrect_input() {
    let registry = registry();

    let mut frame = RawFrame;
    let err = registry.exec("user", Origin::WS, &mut frame).await.unwrap_err();
    assert!(matches!(err, CommandError::IncorrectInput));

    let mut plain = DefaultRequest::default();
    let err = registry.exec("agent", Origin::HTTP, &mut plain).await.unwrap_err();
    assert!(matches!(err, CommandError::IncorrectInput));
}

#[tokio::test]
async fn test_routes_registered_per_transport() {
    let registry = registry();

    let mut ws_routes = Vec::new();
    registry.handle_commands(Origin::WS, |name, pattern| {
        ws_routes.push(format!("/{name}/{pattern}"));
    });
    assert_eq!(ws_routes, ["/user/{id}/{field}"]);

    let mut http_routes = Vec::new();
    registry.handle_commands(Origin::HTTP, |name, _| http_routes.push(name.to_string()));
    http_routes.sort();
    assert_eq!(http_routes, ["agent", "user"]);
}

#[tokio::test]
async fn test_case_mode_is_configurable() {
    let registry = Registry::with_config(RegistryConfig {
        case: CaseMode::Insensitive,
        ..RegistryConfig::default()
    });
    registry
        .add(
            CommandEntry::new("Ping", Origin::ALL)
                .with_handler(handler_fn(|_, _, _| Ok(Bytes::from_static(b"pong")))),
        )
        .unwrap();

    let reply = registry.dispatch_line(b"PING", Origin::HTTP).await.unwrap();
    assert_eq!(&reply[..], b"pong");
}

#[tokio::test]
async fn test_concurrent_exec_and_replace() {
    let registry = Arc::new(registry());
    let mut tasks = Vec::new();
    for i in 0..32 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            if i % 8 == 0 {
                registry
                    .add(
                        CommandEntry::new("user", Origin::ALL)
                            .with_params("{id}/{field}")
                            .with_handler(handler_fn(|_, _, _| Ok(Bytes::from_static(b"v2")))),
                    )
                    .unwrap();
                None
            } else {
                Some(registry.dispatch_line(b"user/1/name", Origin::WS).await)
            }
        }));
    }

    for task in tasks {
        if let Some(result) = task.await.unwrap() {
            let reply = result.unwrap();
            assert!(&reply[..] == b"1.name" || &reply[..] == b"v2");
        }
    }
}
