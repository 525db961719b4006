use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use domain::entity::{EntityDescription, EntityState, StateWriter};
use domain::error::Result;
use domain::satellite::UpdateHandler;
use domain::value::SENTINEL_STATES;
use domain::{DomainError, SatelliteDevice, UpdateClass};

use super::{EntityContext, EntityCore, SatelliteEntity};

/// Placeholder option offered ahead of the device's wake words.
pub const NO_WAKE_WORD: &str = "None";

/// Where a select finds its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSource {
    Static(Vec<String>),
    /// [`NO_WAKE_WORD`] followed by the wake words of the device info
    WakeWords,
}

impl OptionSource {
    pub fn fixed<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Static(options.into_iter().map(Into::into).collect())
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Self::WakeWords)
    }
}

/// How the selected option is written to the device setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingEncoding {
    Verbatim,
    /// `Hey Jarvis` -> `hey_jarvis`
    SnakeCase,
    /// Numeric options sent as integers
    Integer,
    /// Named levels mapped to their numeric value
    Levels(Vec<(String, i64)>),
}

impl SettingEncoding {
    pub fn encode(&self, option: &str) -> Value {
        match self {
            Self::Verbatim => json!(option),
            Self::SnakeCase => json!(option.to_lowercase().replace(' ', "_")),
            Self::Integer => option
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| json!(option)),
            Self::Levels(levels) => levels
                .iter()
                .find(|(name, _)| name == option)
                .map(|(_, level)| Value::from(*level))
                .unwrap_or_else(|| json!(option)),
        }
    }
}

/// Option entity backed by a custom setting.
///
/// A restored option that is not valid yet (dynamic options before the
/// device info arrives) is kept pending and applied once, as soon as an
/// info update makes it valid.
pub struct SelectAdapter {
    core: EntityCore,
    options: OptionSource,
    encoding: SettingEncoding,
    pending: Mutex<Option<String>>,
}

impl SelectAdapter {
    pub fn new(
        description: EntityDescription,
        options: OptionSource,
        encoding: SettingEncoding,
        device: Arc<SatelliteDevice>,
        writer: Arc<dyn StateWriter>,
    ) -> Self {
        Self {
            core: EntityCore::new(description, device, writer),
            options,
            encoding,
            pending: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &str {
        self.core.key()
    }

    pub fn options(&self) -> Vec<String> {
        match &self.options {
            OptionSource::Static(options) => options.clone(),
            OptionSource::WakeWords => std::iter::once(NO_WAKE_WORD.to_string())
                .chain(self.core.device().available_wake_words())
                .collect(),
        }
    }

    pub fn current_option(&self) -> Option<String> {
        self.core.value().as_str().map(str::to_string)
    }

    /// Restored option waiting for the device info to offer it.
    pub fn pending_option(&self) -> Option<String> {
        self.pending.lock().clone()
    }

    /// User selection. An explicit choice supersedes any pending restore.
    pub fn select_option(&self, option: &str) -> Result<()> {
        let options = self.options();
        if !options.iter().any(|o| o == option) {
            return Err(DomainError::InvalidOption {
                entity_id: self.core.entity_id().to_string(),
                option: option.to_string(),
            });
        }
        self.pending.lock().take();
        self.apply(option, &options);
        Ok(())
    }

    fn apply(&self, option: &str, options: &[String]) {
        self.core
            .write_with_attributes(json!(option), Some(json!({ "options": options })));
        self.core
            .device()
            .set_custom_setting(self.core.key(), self.encoding.encode(option));
    }

    fn refresh_options(&self, options: &[String]) {
        self.core
            .write_with_attributes(self.core.value(), Some(json!({ "options": options })));
    }

    fn restore(&self, restored: Option<String>) {
        let options = self.options();
        let valid = |option: &str| options.iter().any(|o| o == option);

        match restored {
            Some(option) if valid(&option) => self.apply(&option, &options),
            Some(option) if self.options.is_dynamic() => {
                debug!(
                    entity_id = %self.core.entity_id(),
                    %option,
                    "Restored option not offered yet, keeping it pending"
                );
                *self.pending.lock() = Some(option);
                if let Some(first) = options.first() {
                    self.apply(first, &options);
                }
            }
            Some(option) => {
                debug!(entity_id = %self.core.entity_id(), %option, "Ignoring invalid restored option");
                self.refresh_options(&options);
            }
            None if self.options.is_dynamic() => {
                if let Some(first) = options.first() {
                    self.apply(first, &options);
                }
            }
            None => self.refresh_options(&options),
        }
    }
}

impl UpdateHandler for SelectAdapter {
    fn handle_update(&self, _class: UpdateClass, _data: &Value) {
        let options = self.options();
        let ready = {
            let mut pending = self.pending.lock();
            if pending
                .as_ref()
                .is_some_and(|option| options.iter().any(|o| o == option))
            {
                pending.take()
            } else {
                None
            }
        };

        match ready {
            Some(option) => {
                info!(entity_id = %self.core.entity_id(), %option, "Applying pending option");
                self.apply(&option, &options);
            }
            None => self.refresh_options(&options),
        }
    }
}

#[async_trait]
impl SatelliteEntity for SelectAdapter {
    fn description(&self) -> &EntityDescription {
        self.core.description()
    }

    fn entity_id(&self) -> &str {
        self.core.entity_id()
    }

    fn state(&self) -> EntityState {
        self.core.state()
    }

    async fn added(self: Arc<Self>, ctx: &EntityContext) {
        if self.options.is_dynamic() {
            let handler: Arc<dyn UpdateHandler> = self.clone();
            self.core.device().set_info_listener(Arc::downgrade(&handler));
        }

        let restored = self
            .core
            .last_state(ctx.repository.as_ref())
            .await
            .filter(|state| !SENTINEL_STATES.contains(&state.as_str()));
        self.restore(restored);
    }
}
