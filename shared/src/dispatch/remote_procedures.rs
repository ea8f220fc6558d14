use std::{collections::HashMap, fmt, str::FromStr};

use log::debug;

use crate::{dispatch::RpcError, Value, ValueMismatch};

/// Names a remote procedure as `<object>.<component>.<method>`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RpcTarget {
    object: String,
    component: String,
    method: String,
}

impl RpcTarget {
    /// Each part must be non-empty and free of dots
    pub fn new(object: &str, component: &str, method: &str) -> Result<Self, RpcError> {
        let valid = |part: &str| !part.is_empty() && !part.contains('.');
        if !(valid(object) && valid(component) && valid(method)) {
            return Err(RpcError::MalformedIdentifier {
                identifier: format!("{}.{}.{}", object, component, method),
            });
        }
        Ok(Self {
            object: object.to_string(),
            component: component.to_string(),
            method: method.to_string(),
        })
    }

    pub fn parse(identifier: &str) -> Result<Self, RpcError> {
        let parts: Vec<&str> = identifier.split('.').collect();
        match parts.as_slice() {
            [object, component, method] => Self::new(object, component, method),
            _ => Err(RpcError::MalformedIdentifier {
                identifier: identifier.to_string(),
            }),
        }
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl FromStr for RpcTarget {
    type Err = RpcError;

    fn from_str(identifier: &str) -> Result<Self, Self::Err> {
        Self::parse(identifier)
    }
}

impl fmt::Display for RpcTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.object, self.component, self.method)
    }
}

/// Converts a remote call's argument list into typed parameters
pub trait FromArgs: Sized {
    fn from_args(args: &[Value]) -> Result<Self, RpcError>;
}

impl FromArgs for () {
    fn from_args(args: &[Value]) -> Result<Self, RpcError> {
        if !args.is_empty() {
            return Err(RpcError::ArgumentCount {
                expected: 0,
                found: args.len(),
            });
        }
        Ok(())
    }
}

macro_rules! impl_from_args {
    ($count:literal; $($param:ident $index:tt),+) => {
        impl<$($param),+> FromArgs for ($($param,)+)
        where
            $($param: TryFrom<Value>, ValueMismatch: From<<$param as TryFrom<Value>>::Error>,)+
        {
            fn from_args(args: &[Value]) -> Result<Self, RpcError> {
                if args.len() != $count {
                    return Err(RpcError::ArgumentCount {
                        expected: $count,
                        found: args.len(),
                    });
                }
                Ok(($(
                    <$param as TryFrom<Value>>::try_from(args[$index].clone()).map_err(|error| {
                        RpcError::ArgumentType {
                            index: $index,
                            source: ValueMismatch::from(error),
                        }
                    })?,
                )+))
            }
        }
    };
}

impl_from_args!(1; A 0);
impl_from_args!(2; A 0, B 1);
impl_from_args!(3; A 0, B 1, C 2);
impl_from_args!(4; A 0, B 1, C 2, D 3);

type Procedure = Box<dyn FnMut(&[Value]) -> Result<(), RpcError>>;

/// Procedures that remote calls may name. Every participant registers the
/// same set before the session starts.
#[derive(Default)]
pub struct RemoteProcedures {
    procedures: HashMap<RpcTarget, Procedure>,
}

impl RemoteProcedures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a procedure taking the raw argument list
    pub fn register<F>(&mut self, identifier: &str, procedure: F) -> Result<RpcTarget, RpcError>
    where
        F: FnMut(&[Value]) -> Result<(), RpcError> + 'static,
    {
        let target = RpcTarget::parse(identifier)?;
        if self.procedures.contains_key(&target) {
            return Err(RpcError::DuplicateProcedure {
                identifier: target.to_string(),
            });
        }
        debug!("registered remote procedure {}", target);
        self.procedures.insert(target.clone(), Box::new(procedure));
        Ok(target)
    }

    /// Registers a procedure whose arguments are converted to `A` first
    pub fn register_typed<A, F>(
        &mut self,
        identifier: &str,
        mut procedure: F,
    ) -> Result<RpcTarget, RpcError>
    where
        A: FromArgs,
        F: FnMut(A) + 'static,
    {
        self.register(identifier, move |args| {
            procedure(A::from_args(args)?);
            Ok(())
        })
    }

    pub fn contains(&self, target: &RpcTarget) -> bool {
        self.procedures.contains_key(target)
    }

    pub fn invoke(&mut self, target: &RpcTarget, args: &[Value]) -> Result<(), RpcError> {
        let Some(procedure) = self.procedures.get_mut(target) else {
            return Err(RpcError::UnknownTarget {
                identifier: target.to_string(),
            });
        };
        procedure(args)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}
