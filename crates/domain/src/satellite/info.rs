use serde::{Deserialize, Serialize};

/// Name of the wake program that lists the selectable wake words.
pub const AVAILABLE_WAKE_WORDS: &str = "available_wake_words";

/// Static capability descriptor sent by the satellite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SatelliteInfo {
    #[serde(default)]
    pub wake: Vec<WakeProgram>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeProgram {
    pub name: String,
    #[serde(default)]
    pub models: Vec<WakeModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeModel {
    pub name: String,
    #[serde(default)]
    pub phrase: Option<String>,
}

impl SatelliteInfo {
    /// Display labels of the selectable wake words (`hey_jarvis` -> `Hey Jarvis`).
    pub fn available_wake_words(&self) -> Vec<String> {
        self.wake
            .iter()
            .rev()
            .find(|program| program.name == AVAILABLE_WAKE_WORDS)
            .map(|program| {
                program
                    .models
                    .iter()
                    .map(|model| wake_word_label(&model.name))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Underscores to spaces, then title case: a letter is upper-cased when it
/// does not follow another letter (`ok_nabu2x` -> `Ok Nabu2X`).
pub fn wake_word_label(model_name: &str) -> String {
    let mut label = String::with_capacity(model_name.len());
    let mut after_letter = false;
    for c in model_name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if after_letter {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            label.push(c);
            after_letter = false;
        }
    }
    label
}
