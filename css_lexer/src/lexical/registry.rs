//! Recognizer registry with per-character and per-state dispatch indexes
//!
//! Dispatch priority is registration order. The default recognizers are
//! registered in `DEFAULT_RECOGNIZER_ORDER`.

use super::recognizer::{Recognizer, RecognizerId, TriggerStates};
use super::recognizers;
use super::state::LexState;
use crate::logging::{codes, Code};
use std::collections::HashMap;

/// Registration order of the built-in recognizers
pub const DEFAULT_RECOGNIZER_ORDER: [&str; 9] = [
    recognizers::charset::NAME,
    recognizers::block_at_rule::FONT_FACE,
    recognizers::block_at_rule::PAGE,
    recognizers::block_at_rule::VARIABLES,
    recognizers::comment::NAME,
    recognizers::ruleset::NAME,
    recognizers::url::NAME,
    recognizers::string::NAME,
    recognizers::media::NAME,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("a recognizer named '{name}' is already registered")]
    DuplicateName { name: &'static str },
}

impl RegistryError {
    pub fn error_code(&self) -> Code {
        match self {
            RegistryError::DuplicateName { .. } => codes::registry::DUPLICATE_RECOGNIZER,
        }
    }
}

pub struct RecognizerRegistry {
    recognizers: Vec<Box<dyn Recognizer>>,
    names: HashMap<&'static str, RecognizerId>,
    by_char: HashMap<char, Vec<RecognizerId>>,
    by_state: HashMap<LexState, Vec<RecognizerId>>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        Self {
            recognizers: Vec::new(),
            names: HashMap::new(),
            by_char: HashMap::new(),
            by_state: HashMap::new(),
        }
    }

    /// Registry holding the built-in recognizers in their fixed order
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for recognizer in recognizers::default_recognizers() {
            registry.insert(recognizer);
        }
        registry
    }

    /// Register a recognizer after all existing ones
    pub fn register(&mut self, recognizer: Box<dyn Recognizer>) -> Result<RecognizerId, RegistryError> {
        let name = recognizer.name();
        if self.names.contains_key(name) {
            crate::log_error!(
                codes::registry::DUPLICATE_RECOGNIZER,
                "Duplicate recognizer name",
                "name" => name
            );
            return Err(RegistryError::DuplicateName { name });
        }
        Ok(self.insert(recognizer))
    }

    fn insert(&mut self, recognizer: Box<dyn Recognizer>) -> RecognizerId {
        let id = RecognizerId(self.recognizers.len());
        let name = recognizer.name();

        if recognizer.trigger_chars().is_empty() {
            crate::log_warning!(
                code = codes::registry::INERT_RECOGNIZER,
                "Recognizer declares no trigger characters",
                "name" => name
            );
        }

        for &ch in recognizer.trigger_chars() {
            let bucket = self.by_char.entry(ch).or_default();
            if !bucket.contains(&id) {
                bucket.push(id);
            }
        }

        match recognizer.trigger_states() {
            TriggerStates::Any => {
                for state in LexState::ALL {
                    self.by_state.entry(state).or_default().push(id);
                }
            }
            TriggerStates::Only(states) => {
                for state in states {
                    let bucket = self.by_state.entry(state).or_default();
                    if !bucket.contains(&id) {
                        bucket.push(id);
                    }
                }
            }
        }

        self.names.insert(name, id);
        self.recognizers.push(recognizer);

        crate::log_debug!("Recognizer registered", "name" => name, "id" => id);
        id
    }

    /// Eligible recognizers for `ch` in `state`, in priority order, written into `out`
    pub fn candidates(&self, ch: char, state: LexState, out: &mut Vec<RecognizerId>) {
        out.clear();
        let (Some(for_char), Some(for_state)) = (self.by_char.get(&ch), self.by_state.get(&state))
        else {
            return;
        };
        // Both buckets are filled in ascending id order
        out.extend(
            for_char
                .iter()
                .filter(|id| for_state.binary_search(id).is_ok())
                .copied(),
        );
    }

    pub fn get_mut(&mut self, id: RecognizerId) -> Option<&mut (dyn Recognizer + 'static)> {
        self.recognizers.get_mut(id.0).map(|boxed| boxed.as_mut())
    }

    pub fn name_of(&self, id: RecognizerId) -> Option<&'static str> {
        self.recognizers.get(id.0).map(|r| r.name())
    }

    pub fn id_of(&self, name: &str) -> Option<RecognizerId> {
        self.names.get(name).copied()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    pub(crate) fn reset_all(&mut self) {
        for recognizer in &mut self.recognizers {
            recognizer.reset();
        }
    }
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
