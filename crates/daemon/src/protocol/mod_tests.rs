use super::*;

#[test]
fn request_round_trips_id_method_and_params() {
    let line = r#"{"jsonrpc":"2.0","id":7,"method":"atlas.search","params":{"query":"foo","limit":5}}"#;
    match parse_line(line).unwrap() {
        InboundMessage::Request(req) => {
            assert_eq!(req.id, serde_json::json!(7));
            assert_eq!(req.method, "atlas.search");
            assert_eq!(req.params, serde_json::json!({"query": "foo", "limit": 5}));
        }
        InboundMessage::StrayResponse => panic!("expected a request"),
    }
}

#[test]
fn request_with_no_params_defaults_to_null() {
    let line = r#"{"jsonrpc":"2.0","id":1,"method":"atlas.status"}"#;
    match parse_line(line).unwrap() {
        InboundMessage::Request(req) => assert_eq!(req.params, Value::Null),
        InboundMessage::StrayResponse => panic!("expected a request"),
    }
}

#[test]
fn missing_jsonrpc_version_is_invalid_request() {
    let line = r#"{"id":1,"method":"atlas.status"}"#;
    let (id, err) = parse_line(line).unwrap_err();
    assert_eq!(id, Some(serde_json::json!(1)));
    assert_eq!(err.code, ErrorCode::InvalidRequest.code());
}

#[test]
fn malformed_json_has_no_salvaged_id() {
    let line = r#"{"jsonrpc":"2.0", not json"#;
    let (id, err) = parse_line(line).unwrap_err();
    assert!(id.is_none());
    assert_eq!(err.code, ErrorCode::ParseError.code());
}

#[test]
fn stray_response_from_a_client_is_classified_and_dropped() {
    let line = r#"{"jsonrpc":"2.0","id":1,"result":{}}"#;
    assert!(matches!(parse_line(line).unwrap(), InboundMessage::StrayResponse));
}

#[test]
fn success_response_serializes_without_error_field() {
    let response = RpcResponse::success(serde_json::json!(7), serde_json::json!({"ok": true}));
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["result"], serde_json::json!({"ok": true}));
    assert!(value.get("error").is_none());
}

#[test]
fn error_response_serializes_without_result_field() {
    let response = RpcResponse::error(serde_json::json!(7), RpcError::new(ErrorCode::MethodNotFound));
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["error"]["code"], serde_json::json!(ErrorCode::MethodNotFound.code()));
    assert!(value.get("result").is_none());
}

#[test]
fn event_notification_carries_type_and_data_under_event_method() {
    let event = atlas_core::Event::new("ingest.started", serde_json::json!({"taskId": "abc"}));
    let notification = RpcNotification::for_event(&event);
    let value = serde_json::to_value(&notification).unwrap();
    assert_eq!(value["method"], "event");
    assert_eq!(value["params"]["type"], "ingest.started");
    assert_eq!(value["params"]["data"]["taskId"], "abc");
}
