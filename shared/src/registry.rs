use std::{collections::HashMap, fmt};

use log::debug;

use lockstep_serde::{Serde, SerdeErr, StreamReader, StreamWriter, UnsignedInteger24};

use crate::{codec::Serializer, Kind, LockstepError};

/// Wire id of a registered type, written as 3 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(UnsignedInteger24);

impl NetId {
    /// Written in place of a type id when the type is not registered
    pub const UNKNOWN: NetId = NetId(UnsignedInteger24::max());

    /// Keeps the low 24 bits of `id`
    pub fn new(id: u32) -> Self {
        Self(UnsignedInteger24::truncate(id))
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl fmt::Debug for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("NetId(UNKNOWN)")
        } else {
            write!(f, "NetId({})", self.get())
        }
    }
}

impl Serde for NetId {
    fn ser(&self, writer: &mut StreamWriter) {
        self.0.ser(writer);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        Ok(Self(UnsignedInteger24::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        self.0.byte_length()
    }
}

struct Registration {
    kind: Kind,
    serializer: Box<dyn Serializer>,
}

/// Maps local types to wire ids and back, handing ids out in registration
/// order. Two processes that register the same types in the same order agree
/// on every id.
#[derive(Default)]
pub struct TypeRegistry {
    registrations: Vec<Registration>,
    net_ids: HashMap<Kind, NetId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `kind` the next free id. Registering a kind twice fails and
    /// keeps the first serializer.
    pub fn register(
        &mut self,
        kind: Kind,
        serializer: Box<dyn Serializer>,
    ) -> Result<NetId, LockstepError> {
        if self.net_ids.contains_key(&kind) {
            return Err(LockstepError::DuplicateType {
                type_name: kind.name(),
            });
        }
        // the largest id is reserved for unknown types
        let Some(id) = u32::try_from(self.registrations.len())
            .ok()
            .and_then(UnsignedInteger24::new)
            .filter(|id| *id != UnsignedInteger24::max())
        else {
            return Err(LockstepError::RegistryFull {
                type_name: kind.name(),
            });
        };

        let net_id = NetId(id);
        debug!("registered {} as {:?}", kind, net_id);
        self.net_ids.insert(kind, net_id);
        self.registrations.push(Registration { kind, serializer });
        Ok(net_id)
    }

    /// Returns [`NetId::UNKNOWN`] for unregistered kinds
    pub fn net_id_of(&self, kind: &Kind) -> NetId {
        self.net_ids.get(kind).copied().unwrap_or(NetId::UNKNOWN)
    }

    pub fn kind_of(&self, net_id: NetId) -> Option<Kind> {
        self.registration(net_id).map(|registration| registration.kind)
    }

    pub fn serializer(&self, net_id: NetId) -> Option<&dyn Serializer> {
        self.registration(net_id)
            .map(|registration| registration.serializer.as_ref())
    }

    pub fn lookup(&self, kind: &Kind) -> Option<(NetId, &dyn Serializer)> {
        let net_id = *self.net_ids.get(kind)?;
        let serializer = self.serializer(net_id)?;
        Some((net_id, serializer))
    }

    pub fn contains(&self, kind: &Kind) -> bool {
        self.net_ids.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn registration(&self, net_id: NetId) -> Option<&Registration> {
        if net_id.is_unknown() {
            return None;
        }
        self.registrations.get(net_id.get() as usize)
    }
}
