use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

use domain::entity::{EntityDescription, EntityState, FieldSource, StateWriter};
use domain::satellite::UpdateHandler;
use domain::{SatelliteDevice, UpdateClass};

use super::{EntityContext, EntityCore, SatelliteEntity};

/// Read-only entity mirroring one field of the satellite's updates.
///
/// Used for both sensors and binary sensors; the description's coercion
/// decides what the displayed value looks like.
pub struct SensorAdapter {
    core: EntityCore,
}

impl SensorAdapter {
    pub fn new(
        description: EntityDescription,
        device: Arc<SatelliteDevice>,
        writer: Arc<dyn StateWriter>,
    ) -> Self {
        Self {
            core: EntityCore::new(description, device, writer),
        }
    }

    pub fn key(&self) -> &str {
        self.core.key()
    }

    pub fn value(&self) -> Value {
        self.core.value()
    }

    pub fn attributes(&self) -> Option<Value> {
        self.core.state().attributes
    }
}

impl UpdateHandler for SensorAdapter {
    fn handle_update(&self, class: UpdateClass, data: &Value) {
        let description = self.core.description();
        let Some(subscription) = &description.subscription else {
            return;
        };

        let capabilities = self.core.device().capabilities();
        let Some(raw) = subscription
            .source
            .extract(&description.key, data, &capabilities)
        else {
            return;
        };
        let value = description.coercion.apply(&raw);

        // An unresolved path still replaces the payload: the value becomes unavailable
        if let FieldSource::Path(_) = &subscription.source {
            self.core
                .write_with_attributes(value.unwrap_or(Value::Null), Some(data.clone()));
            return;
        }
        let Some(value) = value else {
            trace!(entity_id = %self.core.entity_id(), %class, "Nothing to display");
            return;
        };

        match &subscription.source {
            FieldSource::Capability => {
                self.core.write_with_attributes(value, Some(capabilities.summary()))
            }
            _ => self.core.write(value),
        }
    }
}

#[async_trait]
impl SatelliteEntity for SensorAdapter {
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
        let restored = self
            .core
            .last_state(ctx.repository.as_ref())
            .await
            .and_then(|state| self.core.description().coercion.restore(&state));

        match restored {
            Some(value) => self.core.write(value),
            None => self.core.publish(),
        }

        let handler: Arc<dyn UpdateHandler> = self.clone();
        self.core.connect(ctx, Arc::downgrade(&handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{Dispatcher, SignalKey};
    use crate::state::InMemoryStateStore;
    use domain::entity::Platform;
    use domain::{Capabilities, Coercion, SatelliteId};
    use serde_json::json;

    fn setup(
        description: EntityDescription,
    ) -> (Arc<SensorAdapter>, Arc<InMemoryStateStore>, EntityContext) {
        let store = Arc::new(InMemoryStateStore::new());
        let device = Arc::new(
            SatelliteDevice::new(SatelliteId::new("vaca-1").unwrap(), "dev-1").with_capabilities(
                Capabilities::from_value(&json!({"app_version": "2.1.0", "has_battery": true})),
            ),
        );
        let sensor = Arc::new(SensorAdapter::new(description, device, store.clone()));
        let ctx = EntityContext {
            repository: store.clone(),
            dispatcher: Arc::new(Dispatcher::new()),
        };
        (sensor, store, ctx)
    }

    #[tokio::test]
    async fn test_numeric_string_coerced_to_integer() {
        let desc = EntityDescription::new(Platform::Sensor, "battery_level")
            .subscribe(UpdateClass::StatusUpdate, FieldSource::Sensors);
        let (sensor, store, ctx) = setup(desc);
        sensor.clone().added(&ctx).await;

        let reached = ctx.dispatcher.send(
            &SignalKey::new("dev-1", UpdateClass::StatusUpdate),
            &json!({"sensors": {"battery_level": "87"}}),
        );

        assert_eq!(reached, 1);
        assert_eq!(sensor.value(), json!(87));
        assert_eq!(
            store.current("sensor.vaca_1_battery_level").unwrap().value,
            json!(87)
        );
    }

    #[tokio::test]
    async fn test_absent_field_leaves_state_unchanged() {
        let desc = EntityDescription::new(Platform::Sensor, "light")
            .subscribe(UpdateClass::StatusUpdate, FieldSource::Sensors);
        let (sensor, _store, ctx) = setup(desc);
        sensor.clone().added(&ctx).await;
        sensor.handle_update(UpdateClass::StatusUpdate, &json!({"sensors": {"light": "312"}}));

        sensor.handle_update(
            UpdateClass::StatusUpdate,
            &json!({"sensors": {"orientation": "landscape"}}),
        );

        assert_eq!(sensor.value(), json!(312));
    }

    #[tokio::test]
    async fn test_restores_last_state() {
        let desc = EntityDescription::new(Platform::Sensor, "battery_level")
            .subscribe(UpdateClass::StatusUpdate, FieldSource::Sensors);
        let (sensor, store, ctx) = setup(desc);
        store.seed("sensor.vaca_1_battery_level", "42");

        sensor.clone().added(&ctx).await;

        assert_eq!(sensor.value(), json!(42));
    }

    #[tokio::test]
    async fn test_empty_text_is_ignored() {
        let desc = EntityDescription::new(Platform::Sensor, "stt")
            .subscribe(UpdateClass::SttText, FieldSource::Text)
            .coercion(Coercion::Text);
        let (sensor, _store, ctx) = setup(desc);
        sensor.clone().added(&ctx).await;

        sensor.handle_update(UpdateClass::SttText, &json!({"text": "turn on the lights"}));
        sensor.handle_update(UpdateClass::SttText, &json!({"text": ""}));

        assert_eq!(sensor.value(), json!("turn on the lights"));
    }

    #[tokio::test]
    async fn test_path_source_carries_payload_as_attributes() {
        let desc = EntityDescription::new(Platform::Sensor, "intent")
            .subscribe(
                UpdateClass::IntentOutput,
                FieldSource::Path("intent_output.response.speech.plain.speech".into()),
            )
            .coercion(Coercion::Text);
        let (sensor, _store, ctx) = setup(desc);
        sensor.clone().added(&ctx).await;

        let data = json!({"intent_output": {"response": {"speech": {"plain": {"speech": "Done"}}}}});
        sensor.handle_update(UpdateClass::IntentOutput, &data);

        assert_eq!(sensor.value(), json!("Done"));
        assert_eq!(sensor.attributes(), Some(data));
    }

    #[tokio::test]
    async fn test_unresolved_path_makes_value_unavailable() {
        let desc = EntityDescription::new(Platform::Sensor, "intent")
            .subscribe(
                UpdateClass::IntentOutput,
                FieldSource::Path("intent_output.response.speech.plain.speech".into()),
            )
            .coercion(Coercion::Text);
        let (sensor, store, ctx) = setup(desc);
        sensor.clone().added(&ctx).await;
        sensor.handle_update(
            UpdateClass::IntentOutput,
            &json!({"intent_output": {"response": {"speech": {"plain": {"speech": "Turned on"}}}}}),
        );

        let error = json!({"intent_output": {"response": {"response_type": "error"}}});
        sensor.handle_update(UpdateClass::IntentOutput, &error);

        assert_eq!(sensor.value(), Value::Null);
        assert_eq!(sensor.attributes(), Some(error));
        assert_eq!(
            store.current("sensor.vaca_1_intent").unwrap().persisted_value(),
            "unknown"
        );
    }

    #[tokio::test]
    async fn test_path_ignored_when_root_absent() {
        let desc = EntityDescription::new(Platform::Sensor, "intent")
            .subscribe(
                UpdateClass::IntentOutput,
                FieldSource::Path("intent_output.response.speech.plain.speech".into()),
            )
            .coercion(Coercion::Text);
        let (sensor, _store, ctx) = setup(desc);
        sensor.clone().added(&ctx).await;
        let data = json!({"intent_output": {"response": {"speech": {"plain": {"speech": "Done"}}}}});
        sensor.handle_update(UpdateClass::IntentOutput, &data);

        sensor.handle_update(UpdateClass::IntentOutput, &json!({"conversation_id": "abc"}));

        assert_eq!(sensor.value(), json!("Done"));
        assert_eq!(sensor.attributes(), Some(data));
    }

    #[tokio::test]
    async fn test_capability_source_carries_summary() {
        let desc = EntityDescription::new(Platform::Sensor, "app_version")
            .subscribe(UpdateClass::CapabilitiesUpdate, FieldSource::Capability);
        let (sensor, _store, ctx) = setup(desc);
        sensor.clone().added(&ctx).await;

        sensor.handle_update(UpdateClass::CapabilitiesUpdate, &json!({}));

        assert_eq!(sensor.value(), json!("2.1.0"));
        assert_eq!(sensor.attributes().unwrap()["has_battery"], json!(true));
    }
}
