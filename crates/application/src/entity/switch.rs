use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::debug;

use domain::entity::{EntityDescription, EntityState, StateWriter};
use domain::satellite::UpdateHandler;
use domain::value::coerce_bool;
use domain::{CustomAction, SatelliteDevice, UpdateClass};

use super::{EntityContext, EntityCore, SatelliteEntity};

/// What a switch drives on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchTarget {
    /// The custom setting named after the switch key
    Setting,
    /// A custom action carrying `{"activate": bool, "url": ""}`
    Action(CustomAction),
}

/// Boolean entity writing a setting (or firing an action) on the device.
pub struct SwitchAdapter {
    core: EntityCore,
    target: SwitchTarget,
}

impl SwitchAdapter {
    pub fn new(
        description: EntityDescription,
        target: SwitchTarget,
        device: Arc<SatelliteDevice>,
        writer: Arc<dyn StateWriter>,
    ) -> Self {
        Self {
            core: EntityCore::new(description, device, writer),
            target,
        }
    }

    pub fn key(&self) -> &str {
        self.core.key()
    }

    pub fn is_on(&self) -> bool {
        coerce_bool(&self.core.value())
    }

    pub fn turn_on(&self) {
        self.do_switch(true, true);
    }

    pub fn turn_off(&self) {
        self.do_switch(false, true);
    }

    pub fn toggle(&self) {
        self.do_switch(!self.is_on(), true);
    }

    /// Display `on` and, when `send_to_device`, push it to the device.
    fn do_switch(&self, on: bool, send_to_device: bool) {
        self.core.write(Value::Bool(on));
        if !send_to_device {
            return;
        }

        match self.target {
            SwitchTarget::Setting => self.core.device().set_custom_setting(self.core.key(), on),
            SwitchTarget::Action(action) => {
                let mut payload = Map::new();
                payload.insert("activate".to_string(), json!(on));
                payload.insert("url".to_string(), json!(""));
                self.core.device().send_custom_action(action, Some(payload));
            }
        }
    }
}

impl UpdateHandler for SwitchAdapter {
    // Device-reported state: display only, never echoed back.
    fn handle_update(&self, _class: UpdateClass, data: &Value) {
        let description = self.core.description();
        let Some(subscription) = &description.subscription else {
            return;
        };
        let capabilities = self.core.device().capabilities();
        if let Some(raw) = subscription
            .source
            .extract(&description.key, data, &capabilities)
        {
            self.do_switch(coerce_bool(&raw), false);
        }
    }
}

#[async_trait]
impl SatelliteEntity for SwitchAdapter {
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
        let description = self.core.description();
        let restored = self
            .core
            .last_state(ctx.repository.as_ref())
            .await
            .and_then(|state| description.coercion.restore(&state))
            .map(|value| coerce_bool(&value));
        let on = restored.unwrap_or_else(|| coerce_bool(&description.default));

        debug!(
            entity_id = %self.core.entity_id(),
            on,
            restored = restored.is_some(),
            "Applying initial switch state"
        );
        self.do_switch(on, !description.feedback_only);

        let handler: Arc<dyn UpdateHandler> = self.clone();
        self.core.connect(ctx, Arc::downgrade(&handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Dispatcher;
    use crate::state::InMemoryStateStore;
    use domain::entity::{FieldSource, Platform};
    use domain::satellite::{ActionListener, SettingsListener};
    use domain::{Coercion, Command, SatelliteId};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Outbox {
        settings: Mutex<Vec<Map<String, Value>>>,
        actions: Mutex<Vec<Command>>,
    }

    impl SettingsListener for Outbox {
        fn settings_changed(&self, _id: &SatelliteId, settings: &Map<String, Value>) {
            self.settings.lock().push(settings.clone());
        }
    }

    impl ActionListener for Outbox {
        fn action_requested(&self, _id: &SatelliteId, command: &Command) {
            self.actions.lock().push(command.clone());
        }
    }

    struct Fixture {
        switch: Arc<SwitchAdapter>,
        device: Arc<SatelliteDevice>,
        store: Arc<InMemoryStateStore>,
        outbox: Arc<Outbox>,
        ctx: EntityContext,
    }

    fn fixture(description: EntityDescription, target: SwitchTarget) -> Fixture {
        let store = Arc::new(InMemoryStateStore::new());
        let outbox = Arc::new(Outbox::default());
        let device = Arc::new(SatelliteDevice::new(SatelliteId::new("vaca-1").unwrap(), "dev-1"));
        device.set_custom_settings_listener(outbox.clone());
        device.set_custom_action_listener(outbox.clone());
        let switch = Arc::new(SwitchAdapter::new(description, target, device.clone(), store.clone()));
        let ctx = EntityContext {
            repository: store.clone(),
            dispatcher: Arc::new(Dispatcher::new()),
        };
        Fixture {
            switch,
            device,
            store,
            outbox,
            ctx,
        }
    }

    fn mute() -> EntityDescription {
        EntityDescription::new(Platform::Switch, "mute")
            .coercion(Coercion::Boolean)
            .default_value(false)
    }

    fn alarm() -> EntityDescription {
        EntityDescription::new(Platform::Switch, "alarm")
            .coercion(Coercion::Boolean)
            .default_value(false)
            .feedback_only()
            .subscribe(UpdateClass::SettingsUpdate, FieldSource::Settings)
    }

    #[tokio::test]
    async fn test_startup_applies_default_setting() {
        let f = fixture(mute(), SwitchTarget::Setting);
        f.switch.clone().added(&f.ctx).await;

        assert!(!f.switch.is_on());
        assert_eq!(f.device.custom_setting("mute"), Some(json!(false)));
        assert_eq!(f.outbox.settings.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_restored_state_wins_over_default() {
        let f = fixture(mute(), SwitchTarget::Setting);
        f.store.seed("switch.vaca_1_mute", "on");
        f.switch.clone().added(&f.ctx).await;

        assert!(f.switch.is_on());
        assert_eq!(f.device.custom_setting("mute"), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_unknown_restore_falls_back_to_default() {
        let desc = EntityDescription::new(Platform::Switch, "swipe_refresh")
            .coercion(Coercion::Boolean)
            .default_value(true);
        let f = fixture(desc, SwitchTarget::Setting);
        f.store.seed("switch.vaca_1_swipe_refresh", "unavailable");
        f.switch.clone().added(&f.ctx).await;

        assert!(f.switch.is_on());
    }

    #[tokio::test]
    async fn test_toggle_writes_setting() {
        let f = fixture(mute(), SwitchTarget::Setting);
        f.switch.clone().added(&f.ctx).await;

        f.switch.toggle();

        assert!(f.switch.is_on());
        assert_eq!(f.outbox.settings.lock().last().unwrap()["mute"], json!(true));
        assert_eq!(f.store.current("switch.vaca_1_mute").unwrap().persisted_value(), "on");
    }

    #[tokio::test]
    async fn test_feedback_switch_startup_does_not_send() {
        let f = fixture(alarm(), SwitchTarget::Action(CustomAction::Alarm));
        f.store.seed("switch.vaca_1_alarm", "on");
        f.switch.clone().added(&f.ctx).await;

        assert!(f.switch.is_on());
        assert!(f.outbox.actions.lock().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_update_displays_without_echo() {
        let f = fixture(alarm(), SwitchTarget::Action(CustomAction::Alarm));
        f.store.seed("switch.vaca_1_alarm", "on");
        f.switch.clone().added(&f.ctx).await;

        f.switch
            .handle_update(UpdateClass::SettingsUpdate, &json!({"settings": {"alarm": false}}));

        assert!(!f.switch.is_on());
        assert!(f.outbox.actions.lock().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_switch_user_action_sends_alarm() {
        let f = fixture(alarm(), SwitchTarget::Action(CustomAction::Alarm));
        f.switch.clone().added(&f.ctx).await;

        f.switch.turn_on();

        let actions = f.outbox.actions.lock();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, CustomAction::Alarm);
        assert_eq!(
            Value::Object(actions[0].payload.clone().unwrap()),
            json!({"activate": true, "url": ""})
        );
    }
}
