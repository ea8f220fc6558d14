use crate::{
    codec::{self, Class, List, Schema},
    messages::NetworkData,
    ErrorBuffer, LockstepError, SequenceId, TypeRegistry, Value, ValueMismatch,
    NO_OP_SEQUENCE_ID,
};

/// One lockstep batch: the items every participant executes together
#[derive(Clone, Debug, PartialEq)]
pub struct LockStepMessage {
    pub sequence_id: SequenceId,
    pub payload: Vec<NetworkData>,
}

impl Default for LockStepMessage {
    fn default() -> Self {
        Self::no_op(Vec::new())
    }
}

impl LockStepMessage {
    pub fn new(sequence_id: SequenceId, payload: Vec<NetworkData>) -> Self {
        Self {
            sequence_id,
            payload,
        }
    }

    /// A batch that consumes no sequence id
    pub fn no_op(payload: Vec<NetworkData>) -> Self {
        Self::new(NO_OP_SEQUENCE_ID, payload)
    }

    pub fn is_no_op(&self) -> bool {
        self.sequence_id == NO_OP_SEQUENCE_ID
    }

    pub fn to_value(&self) -> Value {
        Value::object(self.clone())
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let message = object.borrow::<LockStepMessage>()?;
        Some(message.clone())
    }

    pub fn encode(&self, registry: &TypeRegistry, errors: &mut ErrorBuffer) -> Vec<u8> {
        codec::serialize(registry, errors, &self.to_value())
    }

    /// Decodes the first value of `bytes`, recording an error if it is not a
    /// lockstep message. A batch that yields nothing is always reported.
    pub fn decode(registry: &TypeRegistry, errors: &mut ErrorBuffer, bytes: &[u8]) -> Option<Self> {
        let recorded = errors.len();
        let values = codec::deserialize(registry, errors, bytes);
        let Some(first) = values.first() else {
            if errors.len() == recorded {
                errors.push(LockstepError::UnexpectedPayload {
                    type_name: "nothing",
                });
            }
            return None;
        };
        let message = Self::from_value(first);
        if message.is_none() {
            errors.push(LockstepError::UnexpectedPayload {
                type_name: first.type_name(),
            });
        }
        message
    }
}

impl Class for LockStepMessage {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .field(
                "sequence_id",
                |message| message.sequence_id.into(),
                |message, value| {
                    message.sequence_id = value.try_into()?;
                    Ok(())
                },
            )
            .field(
                "payload",
                |message| {
                    Value::object(
                        message
                            .payload
                            .iter()
                            .map(NetworkData::to_value)
                            .collect::<List<NetworkData>>(),
                    )
                },
                |message, value| {
                    message.payload = payload_from_list(value)?;
                    Ok(())
                },
            )
    }
}

fn payload_from_list(value: Value) -> Result<Vec<NetworkData>, ValueMismatch> {
    let list = match &value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(object) => object
            .borrow::<List<NetworkData>>()
            .map(|list| list.to_vec())
            .ok_or_else(|| ValueMismatch::new("List<NetworkData>", &value))?,
        other => return Err(ValueMismatch::new("List<NetworkData>", other)),
    };

    list.iter()
        .filter(|item| !item.is_null())
        .map(NetworkData::from_value)
        .collect()
}
