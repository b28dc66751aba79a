use serde::{Deserialize, Serialize};

/// Inbound WebSocket events from client to server.
///
/// Identity fields on `sendGroupMessage` are client-claimed and not
/// verified against a credential; the group channel accepts any
/// connection (see the auth notes in DESIGN.md).
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "sendGroupMessage", rename_all = "camelCase")]
    SendGroupMessage {
        user_id: i64,
        user_name: String,
        message: String,
    },
}

/// Outbound WebSocket events from server to client.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    /// Re-emission of a group send to every registered connection,
    /// payload unchanged.
    #[serde(rename = "receiveGroupMessage", rename_all = "camelCase")]
    ReceiveGroupMessage {
        user_id: i64,
        user_name: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_group_send_parses_camel_case() {
        let raw = r#"{"type":"sendGroupMessage","userId":1,"userName":"alice","message":"hi"}"#;
        let evt: WsInboundEvent = serde_json::from_str(raw).unwrap();
        let WsInboundEvent::SendGroupMessage {
            user_id,
            user_name,
            message,
        } = evt;
        assert_eq!(user_id, 1);
        assert_eq!(user_name, "alice");
        assert_eq!(message, "hi");
    }

    #[test]
    fn outbound_group_receive_serializes_camel_case() {
        let evt = WsOutboundEvent::ReceiveGroupMessage {
            user_id: 1,
            user_name: "alice".into(),
            message: "hi".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&evt).unwrap();
        assert_eq!(json["type"], "receiveGroupMessage");
        assert_eq!(json["userId"], 1);
        assert_eq!(json["userName"], "alice");
        assert_eq!(json["message"], "hi");
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let raw = r#"{"type":"sendEverything","userId":1}"#;
        assert!(serde_json::from_str::<WsInboundEvent>(raw).is_err());
    }

    #[test]
    fn missing_field_is_rejected() {
        let raw = r#"{"type":"sendGroupMessage","userId":1,"userName":"alice"}"#;
        assert!(serde_json::from_str::<WsInboundEvent>(raw).is_err());
    }
}
