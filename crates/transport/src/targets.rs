//! Per-target topic and payload-encoding table.
//!
//! Targets differ in what their firmware expects on the wire: the relays
//! take a bare command token, the light controller takes a structured
//! switch-state document. Encoding is data in this table, not control flow
//! in the gate, so adding a target never touches dispatch logic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a target expects its command payload encoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// Pass the command token through untouched.
    Raw,
    /// Wrap the token in the structured switch-state document.
    SwitchState,
}

impl PayloadEncoding {
    pub fn encode(&self, payload: &str) -> String {
        match self {
            PayloadEncoding::Raw => payload.to_string(),
            PayloadEncoding::SwitchState => {
                serde_json::json!({ "state": payload }).to_string()
            }
        }
    }
}

/// Outbound configuration for one actuation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub topic: String,
    pub encoding: PayloadEncoding,
}

/// A fully resolved command, ready to publish. Constructed per dispatch and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCommand {
    pub target: String,
    pub topic: String,
    pub payload: String,
}

/// Target id → outbound spec.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: HashMap<String, TargetSpec>,
}

impl TargetRegistry {
    pub fn empty() -> Self {
        Self {
            targets: HashMap::new(),
        }
    }

    pub fn insert(&mut self, target: impl Into<String>, spec: TargetSpec) {
        self.targets.insert(target.into(), spec);
    }

    pub fn contains(&self, target: &str) -> bool {
        self.targets.contains_key(target)
    }

    /// Resolve `target` and encode `payload` per its strategy.
    /// `None` means the target is not configured.
    pub fn resolve(&self, target: &str, payload: &str) -> Option<RelayCommand> {
        self.targets.get(target).map(|spec| RelayCommand {
            target: target.to_string(),
            topic: spec.topic.clone(),
            payload: spec.encoding.encode(payload),
        })
    }
}

impl Default for TargetRegistry {
    /// The deployed device set: two relays on raw tokens, one light on the
    /// structured switch command.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(
            "relay_1",
            TargetSpec {
                topic: "relay_1".to_string(),
                encoding: PayloadEncoding::Raw,
            },
        );
        registry.insert(
            "relay_2",
            TargetSpec {
                topic: "relay_2".to_string(),
                encoding: PayloadEncoding::Raw,
            },
        );
        registry.insert(
            "light",
            TargetSpec {
                topic: "light".to_string(),
                encoding: PayloadEncoding::SwitchState,
            },
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_encoding_passes_token_through() {
        let registry = TargetRegistry::default();
        let cmd = registry.resolve("relay_1", "ON").unwrap();
        assert_eq!(cmd.topic, "relay_1");
        assert_eq!(cmd.payload, "ON");
    }

    #[test]
    fn switch_state_encoding_wraps_token() {
        let registry = TargetRegistry::default();
        let cmd = registry.resolve("light", "ON").unwrap();
        assert_eq!(cmd.topic, "light");

        let doc: serde_json::Value = serde_json::from_str(&cmd.payload).unwrap();
        assert_eq!(doc["state"], "ON");
    }

    #[test]
    fn unknown_target_does_not_resolve() {
        let registry = TargetRegistry::default();
        assert!(registry.resolve("garage_door", "OPEN").is_none());
    }

    #[test]
    fn inserting_a_target_needs_no_gate_changes() {
        let mut registry = TargetRegistry::empty();
        registry.insert(
            "relay_9",
            TargetSpec {
                topic: "barn/relay_9".to_string(),
                encoding: PayloadEncoding::Raw,
            },
        );
        let cmd = registry.resolve("relay_9", "OFF").unwrap();
        assert_eq!(cmd.topic, "barn/relay_9");
        assert_eq!(cmd.payload, "OFF");
    }
}
