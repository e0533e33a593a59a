//! Mapping logical actions onto HTTP calls.
//!
//! Whether an action reads or writes is looked up in [`ACTION_ROUTES`];
//! reads become GET requests with the payload in the query string, writes
//! become POST requests with the payload as a JSON body. New actions are
//! added to the table, nowhere else.

use reqwest::Url;
use serde_json::{Map, Value};
use thiserror::Error;

/// Payload keys naming the backend resource an action targets
const NAMESPACE_KEYS: [&str; 2] = ["resource", "gameNamespace"];

/// Path of the state polling endpoint, relative to the API base
pub const POLL_ENDPOINT: &str = "game_status.php";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Payload must be a JSON object")]
    PayloadNotObject,

    #[error("No resource specified for API call")]
    MissingNamespace,

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Whether an action only reads backend state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Read,
    Write,
}

/// Static action table
pub const ACTION_ROUTES: &[(&str, ActionKind)] = &[
    ("getGameState", ActionKind::Read),
    ("getAiMove", ActionKind::Read),
    ("getAiBid", ActionKind::Read),
    ("getPoints", ActionKind::Read),
    ("checkAuth", ActionKind::Read),
    ("logout", ActionKind::Read),
    ("getRoundStatus", ActionKind::Read),
    ("getRoundResults", ActionKind::Read),
    ("createGame", ActionKind::Write),
    ("joinRoom", ActionKind::Write),
    ("leaveRoom", ActionKind::Write),
    ("playerReady", ActionKind::Write),
    ("setHand", ActionKind::Write),
    ("submitHand", ActionKind::Write),
    ("placeBid", ActionKind::Write),
    ("playCards", ActionKind::Write),
    ("login", ActionKind::Write),
    ("register", ActionKind::Write),
    ("transferPoints", ActionKind::Write),
];

/// Look up an action; anything not in the table is treated as a write.
pub fn kind_of(action: &str) -> ActionKind {
    ACTION_ROUTES
        .iter()
        .find(|(name, _)| *name == action)
        .map(|(_, kind)| *kind)
        .unwrap_or(ActionKind::Write)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully resolved network call
#[derive(Debug, Clone, PartialEq)]
pub struct HttpCall {
    pub method: Method,
    pub url: Url,
    /// JSON body, present only for POST calls
    pub body: Option<Value>,
}

/// Build the call for `action`: `<base>/<namespace>?action=<action>[&query]`.
///
/// The namespace comes out of the payload and is not forwarded.
pub fn build_call(base: &str, action: &str, payload: Value) -> Result<HttpCall, RouteError> {
    let Value::Object(mut fields) = payload else {
        return Err(RouteError::PayloadNotObject);
    };
    let namespace = take_namespace(&mut fields).ok_or(RouteError::MissingNamespace)?;

    let mut url = endpoint(base, &namespace)?;
    url.query_pairs_mut().append_pair("action", action);

    match kind_of(action) {
        ActionKind::Read => {
            append_query(&mut url, &fields);
            Ok(HttpCall {
                method: Method::Get,
                url,
                body: None,
            })
        }
        ActionKind::Write => Ok(HttpCall {
            method: Method::Post,
            url,
            body: Some(Value::Object(fields)),
        }),
    }
}

/// Build the poll call for a room and user
pub fn poll_call(base: &str, room_id: &str, user_id: &str) -> Result<HttpCall, RouteError> {
    let mut url = endpoint(base, POLL_ENDPOINT)?;
    url.query_pairs_mut()
        .append_pair("roomId", room_id)
        .append_pair("userId", user_id);
    Ok(HttpCall {
        method: Method::Get,
        url,
        body: None,
    })
}

fn endpoint(base: &str, path: &str) -> Result<Url, RouteError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path);
    Url::parse(&raw).map_err(|e| RouteError::InvalidUrl {
        url: raw,
        reason: e.to_string(),
    })
}

fn take_namespace(fields: &mut Map<String, Value>) -> Option<String> {
    let mut namespace = None;
    for key in NAMESPACE_KEYS {
        if let Some(value) = fields.remove(key) {
            if namespace.is_none() {
                namespace = value.as_str().filter(|s| !s.is_empty()).map(str::to_string);
            }
        }
    }
    namespace
}

fn append_query(url: &mut Url, fields: &Map<String, Value>) {
    let mut pairs = url.query_pairs_mut();
    for (key, value) in fields {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        pairs.append_pair(key, &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://localhost:8080/api";

    #[test]
    fn test_table_lookup() {
        assert_eq!(kind_of("getGameState"), ActionKind::Read);
        assert_eq!(kind_of("submitHand"), ActionKind::Write);
        assert_eq!(kind_of("somethingNew"), ActionKind::Write);
    }

    #[test]
    fn test_read_goes_to_query() {
        let call = build_call(
            BASE,
            "getGameState",
            json!({"resource": "thirteen-waters", "game_id": 12, "player_id": "player1"}),
        )
        .unwrap();
        assert_eq!(call.method, Method::Get);
        assert!(call.body.is_none());
        assert_eq!(
            call.url.as_str(),
            "http://localhost:8080/api/thirteen-waters?action=getGameState&game_id=12&player_id=player1"
        );
    }

    #[test]
    fn test_write_goes_to_body() {
        let call = build_call(
            BASE,
            "setHand",
            json!({"gameNamespace": "thirteen", "front": ["AS", "KD", "2C"]}),
        )
        .unwrap();
        assert_eq!(call.method, Method::Post);
        assert_eq!(
            call.url.as_str(),
            "http://localhost:8080/api/thirteen?action=setHand"
        );
        assert_eq!(call.body, Some(json!({"front": ["AS", "KD", "2C"]})));
    }

    #[test]
    fn test_namespace_is_never_forwarded() {
        let call = build_call(
            BASE,
            "getPoints",
            json!({"resource": "user", "gameNamespace": "other"}),
        )
        .unwrap();
        assert_eq!(call.url.as_str(), "http://localhost:8080/api/user?action=getPoints");
    }

    #[test]
    fn test_query_values_are_escaped() {
        let call = build_call(BASE, "checkAuth", json!({"resource": "user", "q": "a b&c"})).unwrap();
        assert_eq!(
            call.url.as_str(),
            "http://localhost:8080/api/user?action=checkAuth&q=a+b%26c"
        );
    }

    #[test]
    fn test_route_errors() {
        assert_eq!(
            build_call(BASE, "getPoints", json!({"x": 1})),
            Err(RouteError::MissingNamespace)
        );
        assert_eq!(
            build_call(BASE, "getPoints", json!({"resource": ""})),
            Err(RouteError::MissingNamespace)
        );
        assert_eq!(
            build_call(BASE, "getPoints", json!([1, 2])),
            Err(RouteError::PayloadNotObject)
        );
        assert!(matches!(
            build_call("not a url", "getPoints", json!({"resource": "user"})),
            Err(RouteError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_poll_call() {
        let call = poll_call("http://example.com/api/", "42", "7").unwrap();
        assert_eq!(call.method, Method::Get);
        assert_eq!(
            call.url.as_str(),
            "http://example.com/api/game_status.php?roomId=42&userId=7"
        );
    }
}
