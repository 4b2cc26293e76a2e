use serde_json::Value;

use crate::types::DirectionIntent;

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    StartSession {
        player1_name: Option<String>,
        player2_name: Option<String>,
    },
    PlayerDirection {
        player_index: i64,
        intent: DirectionIntent,
    },
    BridgeHello {
        simulated: bool,
    },
    BridgeDirection {
        intent: DirectionIntent,
    },
    BridgeHeartbeat,
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "start_session" => {
            let player1_name = parse_optional_string(object.get("player1Name"))?;
            let player2_name = parse_optional_string(object.get("player2Name"))?;
            Some(ParsedClientMessage::StartSession {
                player1_name,
                player2_name,
            })
        }
        "player_direction" => {
            let player_index = object.get("playerIndex")?.as_i64()?;
            let intent = parse_intent(object.get("intent")?)?;
            Some(ParsedClientMessage::PlayerDirection {
                player_index,
                intent,
            })
        }
        "bridge_hello" => {
            let simulated = match object.get("simulated") {
                None => false,
                Some(value) => value.as_bool()?,
            };
            Some(ParsedClientMessage::BridgeHello { simulated })
        }
        "bridge_direction" => {
            let intent = parse_intent(object.get("intent")?)?;
            Some(ParsedClientMessage::BridgeDirection { intent })
        }
        "bridge_heartbeat" => Some(ParsedClientMessage::BridgeHeartbeat),
        _ => None,
    }
}

fn parse_optional_string(value: Option<&Value>) -> Option<Option<String>> {
    match value {
        None => Some(None),
        Some(Value::Null) => Some(None),
        Some(value) => Some(Some(value.as_str()?.to_string())),
    }
}

fn parse_intent(value: &Value) -> Option<DirectionIntent> {
    let object = value.as_object()?;
    let flag = |key: &str| -> Option<bool> {
        match object.get(key) {
            None => Some(false),
            Some(value) => value.as_bool(),
        }
    };
    Some(DirectionIntent {
        up: flag("up")?,
        down: flag("down")?,
        left: flag("left")?,
        right: flag("right")?,
    })
}
