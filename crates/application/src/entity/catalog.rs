//! Entities exposed for a satellite, depending on its capabilities.

use domain::entity::{EntityCategory, EntityDescription, FieldSource, Platform};
use domain::{Capabilities, Coercion, CustomAction, UpdateClass};

use super::{OptionSource, SettingEncoding, SwitchTarget};

const INTENT_SPEECH_PATH: &str = "intent_output.response.speech.plain.speech";

pub const NOISE_SUPPRESSION_LEVELS: [(&str, i64); 5] =
    [("off", 0), ("low", 1), ("medium", 2), ("high", 3), ("max", 4)];
pub const WAKE_WORD_SOUNDS: [&str; 5] = ["none", "alexa", "havpe", "ding", "bubble"];
pub const SCREEN_TIMEOUTS: [&str; 7] = ["15", "30", "60", "120", "300", "600", "1800"];

/// One entity to create, with its platform-specific configuration.
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    Sensor(EntityDescription),
    Switch(EntityDescription, SwitchTarget),
    Select(EntityDescription, OptionSource, SettingEncoding),
    Button(EntityDescription, CustomAction),
}

impl CatalogEntry {
    pub fn description(&self) -> &EntityDescription {
        match self {
            Self::Sensor(d) | Self::Switch(d, _) | Self::Select(d, ..) | Self::Button(d, _) => d,
        }
    }
}

/// Full catalog for a satellite with the given capabilities.
pub fn catalog(capabilities: &Capabilities) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    entries.extend(sensors(capabilities).into_iter().map(CatalogEntry::Sensor));
    entries.extend(binary_sensors(capabilities).into_iter().map(CatalogEntry::Sensor));
    entries.extend(
        switches(capabilities)
            .into_iter()
            .map(|(d, target)| CatalogEntry::Switch(d, target)),
    );
    entries.extend(
        selects()
            .into_iter()
            .map(|(d, options, encoding)| CatalogEntry::Select(d, options, encoding)),
    );
    entries.extend(buttons().into_iter().map(|(d, action)| CatalogEntry::Button(d, action)));
    entries
}

fn status_sensor(key: &str) -> EntityDescription {
    EntityDescription::new(Platform::Sensor, key)
        .subscribe(UpdateClass::StatusUpdate, FieldSource::Sensors)
}

pub fn sensors(capabilities: &Capabilities) -> Vec<EntityDescription> {
    let mut sensors = vec![
        EntityDescription::new(Platform::Sensor, "stt")
            .subscribe(UpdateClass::SttText, FieldSource::Text)
            .coercion(Coercion::Text)
            .icon("mdi:microphone-message"),
        EntityDescription::new(Platform::Sensor, "tts")
            .subscribe(UpdateClass::TtsText, FieldSource::Text)
            .coercion(Coercion::Text)
            .icon("mdi:speaker-message"),
        EntityDescription::new(Platform::Sensor, "intent")
            .subscribe(
                UpdateClass::IntentOutput,
                FieldSource::Path(INTENT_SPEECH_PATH.to_string()),
            )
            .coercion(Coercion::Text)
            .icon("mdi:message-bulleted"),
        status_sensor("orientation").icon("mdi:screen-rotation"),
    ];

    if capabilities.app_version().is_some() {
        sensors.push(
            EntityDescription::new(Platform::Sensor, "app_version")
                .subscribe(UpdateClass::CapabilitiesUpdate, FieldSource::Capability)
                .icon("mdi:application")
                .category(EntityCategory::Diagnostic),
        );
    }
    if capabilities.has_battery() {
        sensors.push(status_sensor("battery_level"));
        sensors.push(
            status_sensor("battery_charging")
                .coercion(Coercion::ChargingLabel)
                .icon("mdi:battery-charging"),
        );
    }
    if capabilities.has_light_sensor() {
        sensors.push(status_sensor("light"));
    }
    sensors
}

pub fn binary_sensors(capabilities: &Capabilities) -> Vec<EntityDescription> {
    if !capabilities.has_battery() {
        return Vec::new();
    }
    vec![
        EntityDescription::new(Platform::BinarySensor, "battery_charging")
            .subscribe(UpdateClass::StatusUpdate, FieldSource::Sensors)
            .coercion(Coercion::Boolean),
    ]
}

fn setting_switch(key: &str, default_on: bool, icon: &str) -> (EntityDescription, SwitchTarget) {
    let description = EntityDescription::new(Platform::Switch, key)
        .coercion(Coercion::Boolean)
        .default_value(default_on)
        .icon(icon)
        .category(EntityCategory::Config);
    (description, SwitchTarget::Setting)
}

pub fn switches(capabilities: &Capabilities) -> Vec<(EntityDescription, SwitchTarget)> {
    let mute = EntityDescription::new(Platform::Switch, "mute")
        .coercion(Coercion::Boolean)
        .default_value(false)
        .icon("mdi:microphone-off");
    let diagnostics = EntityDescription::new(Platform::Switch, "diagnostics_enabled")
        .coercion(Coercion::Boolean)
        .default_value(false)
        .icon("mdi:microphone-question")
        .category(EntityCategory::Diagnostic);
    let alarm = EntityDescription::new(Platform::Switch, "alarm")
        .coercion(Coercion::Boolean)
        .default_value(false)
        .feedback_only()
        .subscribe(UpdateClass::SettingsUpdate, FieldSource::Settings)
        .icon("mdi:alarm-bell");

    let mut switches = vec![
        (mute, SwitchTarget::Setting),
        setting_switch("swipe_refresh", true, "mdi:web-refresh"),
        setting_switch("screen_auto_brightness", true, "mdi:monitor-screenshot"),
        setting_switch("screen_always_on", true, "mdi:monitor-screenshot"),
        setting_switch("dark_mode", false, "mdi:compare"),
        (diagnostics, SwitchTarget::Setting),
        setting_switch("continue_conversation", true, "mdi:message-bulleted"),
        (alarm, SwitchTarget::Action(CustomAction::Alarm)),
        setting_switch("screen_on_wake_word", true, "mdi:monitor-eye"),
    ];

    if capabilities.has_dnd() {
        let dnd = EntityDescription::new(Platform::Switch, "do_not_disturb")
            .coercion(Coercion::Boolean)
            .default_value(false)
            .icon("mdi:minus-circle-outline");
        switches.push((dnd, SwitchTarget::Setting));
    }
    if capabilities.supports_bump() {
        switches.push(setting_switch("screen_on_bump", false, "mdi:gesture-tap"));
    }
    if capabilities.supports_proximity() {
        switches.push(setting_switch("screen_on_proximity", false, "mdi:radar"));
    }
    if capabilities.has_front_camera() {
        switches.push(setting_switch("enable_motion_detection", false, "mdi:motion-sensor"));
        switches.push(setting_switch("screen_on_motion", false, "mdi:motion-sensor"));
    }
    switches
}

pub fn selects() -> Vec<(EntityDescription, OptionSource, SettingEncoding)> {
    let config_select = |key: &str| {
        EntityDescription::new(Platform::Select, key).category(EntityCategory::Config)
    };
    vec![
        (
            config_select("noise_suppression_level").default_value("off"),
            OptionSource::fixed(NOISE_SUPPRESSION_LEVELS.map(|(name, _)| name)),
            SettingEncoding::Levels(
                NOISE_SUPPRESSION_LEVELS
                    .iter()
                    .map(|(name, level)| (name.to_string(), *level))
                    .collect(),
            ),
        ),
        (
            config_select("wake_word"),
            OptionSource::WakeWords,
            SettingEncoding::SnakeCase,
        ),
        (
            config_select("wake_word_sound").default_value("havpe"),
            OptionSource::fixed(WAKE_WORD_SOUNDS),
            SettingEncoding::Verbatim,
        ),
        (
            config_select("screen_timeout").default_value("60"),
            OptionSource::fixed(SCREEN_TIMEOUTS),
            SettingEncoding::Integer,
        ),
    ]
}

pub fn buttons() -> Vec<(EntityDescription, CustomAction)> {
    let button = |key: &str| EntityDescription::new(Platform::Button, key).without_restore();
    vec![
        (button("wake"), CustomAction::Wake),
        (button("refresh"), CustomAction::Refresh),
        (button("screen_wake"), CustomAction::ScreenWake),
    ]
}
