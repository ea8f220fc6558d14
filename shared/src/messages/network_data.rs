use log::debug;

use crate::{
    codec::{Array, Class, Schema},
    dispatch::{Dispatcher, RpcError, RpcTarget},
    ErrorBuffer, LockstepError, Value, ValueMismatch,
};

/// Opaque application values handed to every raw data observer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawData {
    pub values: Vec<Value>,
}

impl RawData {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl Class for RawData {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new().field(
            "values",
            |raw| values_to_array(&raw.values),
            |raw, value| {
                raw.values = values_from_array(value)?;
                Ok(())
            },
        )
    }
}

/// Invocation of a registered remote procedure
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemoteCall {
    pub object: String,
    pub component: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl RemoteCall {
    pub fn new(target: &RpcTarget, args: Vec<Value>) -> Self {
        Self {
            object: target.object().to_string(),
            component: target.component().to_string(),
            method: target.method().to_string(),
            args,
        }
    }

    /// Received calls are not trusted to name a well formed target
    pub fn target(&self) -> Result<RpcTarget, RpcError> {
        RpcTarget::new(&self.object, &self.component, &self.method)
    }

    fn identifier(&self) -> String {
        format!("{}.{}.{}", self.object, self.component, self.method)
    }
}

impl Class for RemoteCall {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .field(
                "object",
                |call| call.object.clone().into(),
                |call, value| {
                    call.object = value.try_into()?;
                    Ok(())
                },
            )
            .field(
                "component",
                |call| call.component.clone().into(),
                |call, value| {
                    call.component = value.try_into()?;
                    Ok(())
                },
            )
            .field(
                "method",
                |call| call.method.clone().into(),
                |call, value| {
                    call.method = value.try_into()?;
                    Ok(())
                },
            )
            .field(
                "args",
                |call| values_to_array(&call.args),
                |call, value| {
                    call.args = values_from_array(value)?;
                    Ok(())
                },
            )
    }
}

/// Wraps one domain event, passed to the event dispatcher untouched
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DomainEvent {
    pub event: Value,
}

impl DomainEvent {
    pub fn new(event: Value) -> Self {
        Self { event }
    }
}

impl Class for DomainEvent {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new().field(
            "event",
            |wrapper| wrapper.event.clone(),
            |wrapper, value| {
                wrapper.event = value;
                Ok(())
            },
        )
    }
}

/// One item of a lockstep batch
#[derive(Clone, Debug, PartialEq)]
pub enum NetworkData {
    Raw(RawData),
    Remote(RemoteCall),
    Event(DomainEvent),
}

impl NetworkData {
    pub fn to_value(&self) -> Value {
        match self {
            NetworkData::Raw(raw) => Value::object(raw.clone()),
            NetworkData::Remote(call) => Value::object(call.clone()),
            NetworkData::Event(event) => Value::object(event.clone()),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, ValueMismatch> {
        let mismatch = || ValueMismatch::new("NetworkData", value);
        let object = value.as_object().ok_or_else(mismatch)?;
        if let Some(raw) = object.borrow::<RawData>() {
            return Ok(NetworkData::Raw(raw.clone()));
        }
        if let Some(call) = object.borrow::<RemoteCall>() {
            return Ok(NetworkData::Remote(call.clone()));
        }
        if let Some(event) = object.borrow::<DomainEvent>() {
            return Ok(NetworkData::Event(event.clone()));
        }
        Err(mismatch())
    }

    /// Executes the item. Failures are recorded, never propagated, so one bad
    /// item cannot stop the rest of its batch.
    pub fn apply(&self, dispatcher: &mut Dispatcher, errors: &mut ErrorBuffer) {
        match self {
            NetworkData::Raw(raw) => {
                debug!("applying raw data of {} values", raw.values.len());
                dispatcher.notify_raw_data(&raw.values);
            }
            NetworkData::Remote(call) => {
                debug!("applying remote call {}", call.identifier());
                let result = call
                    .target()
                    .and_then(|target| dispatcher.invoke(&target, &call.args));
                if let Err(source) = result {
                    errors.push(LockstepError::RemoteCallFailed {
                        target: call.identifier(),
                        source,
                    });
                }
            }
            NetworkData::Event(wrapper) => {
                debug!("applying event {}", wrapper.event.type_name());
                dispatcher.dispatch_event(&wrapper.event);
            }
        }
    }
}

impl From<RawData> for NetworkData {
    fn from(raw: RawData) -> Self {
        NetworkData::Raw(raw)
    }
}

impl From<RemoteCall> for NetworkData {
    fn from(call: RemoteCall) -> Self {
        NetworkData::Remote(call)
    }
}

impl From<DomainEvent> for NetworkData {
    fn from(event: DomainEvent) -> Self {
        NetworkData::Event(event)
    }
}

fn values_to_array(values: &[Value]) -> Value {
    Value::object(Array::<Value>::from(values.to_vec()))
}

fn values_from_array(value: Value) -> Result<Vec<Value>, ValueMismatch> {
    match &value {
        Value::Null => Ok(Vec::new()),
        Value::Object(object) => match object.borrow::<Array<Value>>() {
            Some(array) => Ok(array.to_vec()),
            None => Err(ValueMismatch::new("Array<Value>", &value)),
        },
        other => Err(ValueMismatch::new("Array<Value>", other)),
    }
}
