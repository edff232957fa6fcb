/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The envelope exchanged with peers and switched by the router.
///
/// A message is immutable once received: the router reads it, copies it when
/// fanning out to multiple endpoints, and never rewrites any field. The
/// `reference` field carries the uid of an earlier message when the sender is
/// answering it, which is what the one-shot reply map keys on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// 128-bit message identity, unique per message.
    pub uid: Uuid,
    /// Name of the channel this message was sent on.
    pub channel: String,
    /// Application-level subject. Subjects on the `"system"` channel are
    /// control-plane instructions.
    pub subject: String,
    /// Uid of a prior message this one replies to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Uuid>,
    /// Opaque application payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Message {
    /// Builds a message with a fresh uid and no reply reference.
    pub fn new(channel: &str, subject: &str, data: serde_json::Value) -> Self {
        Self {
            uid: Uuid::new_v4(),
            channel: channel.to_string(),
            subject: subject.to_string(),
            reference: None,
            data,
        }
    }

    /// Marks this message as a reply to the message identified by `reference`.
    pub fn with_reference(mut self, reference: Uuid) -> Self {
        self.reference = Some(reference);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Message;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn new_message_has_unique_uid_and_no_reference() {
        let first = Message::new("orders", "new", json!({"qty": 1}));
        let second = Message::new("orders", "new", json!({"qty": 1}));

        assert_ne!(first.uid, second.uid);
        assert!(first.reference.is_none());
    }

    #[test]
    fn reference_round_trips_through_json() {
        let target = Uuid::new_v4();
        let msg = Message::new("orders", "ack", json!("done")).with_reference(target);

        let encoded = serde_json::to_string(&msg).expect("message should encode");
        let decoded: Message = serde_json::from_str(&encoded).expect("message should decode");

        assert_eq!(decoded, msg);
        assert_eq!(decoded.reference, Some(target));
    }

    #[test]
    fn missing_optional_fields_decode_to_defaults() {
        let raw = format!(
            r#"{{"uid":"{}","channel":"orders","subject":"new"}}"#,
            Uuid::new_v4()
        );

        let decoded: Message = serde_json::from_str(&raw).expect("message should decode");

        assert!(decoded.reference.is_none());
        assert!(decoded.data.is_null());
    }
}
