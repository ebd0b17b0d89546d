// src/commands.rs
use barista_core::{BaristaResult, OutputEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::OrderDraft;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "payload", rename_all = "camelCase")]
pub enum UiCommand {
    Highlight {
        item: String,
    },
    AddCoffee {
        item: String,
    },
    AddDessert {
        item: String,
    },
    #[serde(rename_all = "camelCase")]
    AddUserName {
        user_name: String,
    },
    #[serde(rename_all = "camelCase")]
    AddUserAddress {
        user_address: String,
    },
    #[serde(rename_all = "camelCase")]
    AddUserNotes {
        user_notes: String,
    },
    OrderComplete {
        order: OrderDraft,
    },
}

impl UiCommand {
    pub fn name(&self) -> &'static str {
        match self {
            UiCommand::Highlight { .. } => "highlight",
            UiCommand::AddCoffee { .. } => "addCoffee",
            UiCommand::AddDessert { .. } => "addDessert",
            UiCommand::AddUserName { .. } => "addUserName",
            UiCommand::AddUserAddress { .. } => "addUserAddress",
            UiCommand::AddUserNotes { .. } => "addUserNotes",
            UiCommand::OrderComplete { .. } => "orderComplete",
        }
    }

    pub fn into_event(self) -> BaristaResult<OutputEvent> {
        let name = self.name();
        let payload = match serde_json::to_value(&self)? {
            Value::Object(mut map) => map.remove("payload").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        Ok(OutputEvent::command(name, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_serialize_with_front_end_names() {
        let event = UiCommand::AddUserName {
            user_name: "Alex".to_string(),
        }
        .into_event()
        .unwrap();

        assert_eq!(
            event,
            OutputEvent::command("addUserName", json!({"userName": "Alex"}))
        );

        let highlight = UiCommand::Highlight {
            item: "apple-pie".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&highlight).unwrap(),
            json!({"name": "highlight", "payload": {"item": "apple-pie"}})
        );
    }

    #[test]
    fn order_complete_carries_the_draft() {
        let order = OrderDraft {
            coffee_items: vec!["latte".to_string()],
            ..OrderDraft::default()
        };
        let event = UiCommand::OrderComplete { order }.into_event().unwrap();

        match event {
            OutputEvent::Command { name, payload } => {
                assert_eq!(name, "orderComplete");
                assert_eq!(payload["order"]["coffeeItems"], json!(["latte"]));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
