//! Members declared by a [`CilType`]: methods, fields, properties and events.
//!
//! Each member keeps a weak back-reference to its declaring type, installed when the member
//! is added to a type (see [`CilType::add_method`] and friends). A member whose declaring
//! type was never set, or has been dropped, reports `None` from
//! [`MemberDef::declaring_type`]; renderers degrade gracefully in that case.
//!
//! [`MemberRef`] is the cross-reference handle attached to rendered names, so that an output
//! sink can link a piece of text back to the entity it names.

use std::sync::{Arc, OnceLock};

use crate::metadata::{
    token::Token,
    typesystem::{CilType, CilTypeRc, CilTypeRef},
};

/// Reference to a `Method`
pub type MethodRc = Arc<Method>;
/// A vector that holds a list of `Method`
pub type MethodList = Arc<boxcar::Vec<MethodRc>>;
/// Reference to a `Field`
pub type FieldRc = Arc<Field>;
/// A vector that holds a list of `Field`
pub type FieldList = Arc<boxcar::Vec<FieldRc>>;
/// Reference to a `Property`
pub type PropertyRc = Arc<Property>;
/// A vector that holds a list of `Property`
pub type PropertyList = Arc<boxcar::Vec<PropertyRc>>;
/// Reference to an `Event`
pub type EventRc = Arc<Event>;
/// A vector that holds a list of `Event`
pub type EventList = Arc<boxcar::Vec<EventRc>>;

/// Shared accessors of everything a type can declare
pub trait MemberDef {
    /// Token of this member
    fn token(&self) -> Token;
    /// Name of this member
    fn name(&self) -> &str;
    /// The type declaring this member, if set and still alive
    fn declaring_type(&self) -> Option<CilTypeRc>;
}

macro_rules! impl_member_def {
    ($ty:ty) => {
        impl $ty {
            pub(crate) fn set_declaring_type(&self, owner: &CilTypeRc) {
                let _ = self.declaring_type.set(CilTypeRef::new(owner));
            }
        }

        impl MemberDef for $ty {
            fn token(&self) -> Token {
                self.token
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn declaring_type(&self) -> Option<CilTypeRc> {
                self.declaring_type.get().and_then(CilTypeRef::upgrade)
            }
        }
    };
}

/// A method definition (`MethodDef`, §II.22.26)
pub struct Method {
    /// Token
    pub token: Token,
    /// Name of the method
    pub name: String,
    /// RVA of the method body, 0 if the method has none
    pub rva: u32,
    declaring_type: OnceLock<CilTypeRef>,
}

impl Method {
    /// Create a new method without body
    pub fn new(token: Token, name: impl Into<String>) -> MethodRc {
        Self::with_rva(token, name, 0)
    }

    /// Create a new method whose body lives at `rva`
    pub fn with_rva(token: Token, name: impl Into<String>, rva: u32) -> MethodRc {
        Arc::new(Method {
            token,
            name: name.into(),
            rva,
            declaring_type: OnceLock::new(),
        })
    }
}

/// A field definition (`Field`, §II.22.15)
pub struct Field {
    /// Token
    pub token: Token,
    /// Name of the field
    pub name: String,
    declaring_type: OnceLock<CilTypeRef>,
}

impl Field {
    /// Create a new field
    pub fn new(token: Token, name: impl Into<String>) -> FieldRc {
        Arc::new(Field {
            token,
            name: name.into(),
            declaring_type: OnceLock::new(),
        })
    }
}

/// A property definition (`Property`, §II.22.34)
pub struct Property {
    /// Token
    pub token: Token,
    /// Name of the property
    pub name: String,
    /// Number of index parameters; properties with parameters are indexers
    pub param_count: usize,
    declaring_type: OnceLock<CilTypeRef>,
}

impl Property {
    /// Create a new property without index parameters
    pub fn new(token: Token, name: impl Into<String>) -> PropertyRc {
        Self::indexed(token, name, 0)
    }

    /// Create a new property taking `param_count` index parameters
    pub fn indexed(token: Token, name: impl Into<String>, param_count: usize) -> PropertyRc {
        Arc::new(Property {
            token,
            name: name.into(),
            param_count,
            declaring_type: OnceLock::new(),
        })
    }

    /// Returns true if the property takes index parameters
    #[must_use]
    pub fn is_indexer(&self) -> bool {
        self.param_count > 0
    }
}

/// An event definition (`Event`, §II.22.13)
pub struct Event {
    /// Token
    pub token: Token,
    /// Name of the event
    pub name: String,
    declaring_type: OnceLock<CilTypeRef>,
}

impl Event {
    /// Create a new event
    pub fn new(token: Token, name: impl Into<String>) -> EventRc {
        Arc::new(Event {
            token,
            name: name.into(),
            declaring_type: OnceLock::new(),
        })
    }
}

impl_member_def!(Method);
impl_member_def!(Field);
impl_member_def!(Property);
impl_member_def!(Event);

/// A local variable or parameter of a method body, as handed out by a decompiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Slot index of the variable
    pub index: u32,
    /// Name recorded in debug information, if any
    pub name: Option<String>,
}

impl Variable {
    /// Create a new variable
    #[must_use]
    pub fn new(index: u32, name: Option<&str>) -> Self {
        Variable {
            index,
            name: name.map(str::to_string),
        }
    }

    /// The name to show for this variable
    ///
    /// `name` wins if it is not blank, then the variable's own name, and finally `#index`.
    #[must_use]
    pub fn display_name(&self, name: Option<&str>) -> String {
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        if let Some(own) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return own.to_string();
        }
        format!("#{}", self.index)
    }
}

/// A cross-reference target attached to rendered text
#[derive(Clone)]
pub enum MemberRef {
    /// A type definition
    Type(CilTypeRc),
    /// A method definition
    Method(MethodRc),
    /// A field definition
    Field(FieldRc),
    /// A property definition
    Property(PropertyRc),
    /// An event definition
    Event(EventRc),
}

impl MemberRef {
    /// Token of the referenced entity
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            MemberRef::Type(ty) => ty.token,
            MemberRef::Method(m) => m.token,
            MemberRef::Field(f) => f.token,
            MemberRef::Property(p) => p.token,
            MemberRef::Event(e) => e.token,
        }
    }

    /// Simple name of the referenced entity
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MemberRef::Type(ty) => &ty.name,
            MemberRef::Method(m) => &m.name,
            MemberRef::Field(f) => &f.name,
            MemberRef::Property(p) => &p.name,
            MemberRef::Event(e) => &e.name,
        }
    }

    /// Declaring type of the referenced entity
    ///
    /// For types this is the enclosing type of a nested type.
    #[must_use]
    pub fn declaring_type(&self) -> Option<CilTypeRc> {
        match self {
            MemberRef::Type(ty) => ty.enclosing(),
            MemberRef::Method(m) => m.declaring_type(),
            MemberRef::Field(f) => f.declaring_type(),
            MemberRef::Property(p) => p.declaring_type(),
            MemberRef::Event(e) => e.declaring_type(),
        }
    }

    /// All members declared by `ty`, methods first, then fields, properties and events
    #[must_use]
    pub fn members_of(ty: &CilType) -> Vec<MemberRef> {
        let mut members = Vec::with_capacity(ty.member_count());
        members.extend(ty.methods.iter().map(|(_, m)| MemberRef::Method(m.clone())));
        members.extend(ty.fields.iter().map(|(_, f)| MemberRef::Field(f.clone())));
        members.extend(ty.properties.iter().map(|(_, p)| MemberRef::Property(p.clone())));
        members.extend(ty.events.iter().map(|(_, e)| MemberRef::Event(e.clone())));
        members
    }
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MemberRef::Type(a), MemberRef::Type(b)) => Arc::ptr_eq(a, b),
            (MemberRef::Method(a), MemberRef::Method(b)) => Arc::ptr_eq(a, b),
            (MemberRef::Field(a), MemberRef::Field(b)) => Arc::ptr_eq(a, b),
            (MemberRef::Property(a), MemberRef::Property(b)) => Arc::ptr_eq(a, b),
            (MemberRef::Event(a), MemberRef::Event(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for MemberRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            MemberRef::Type(_) => "Type",
            MemberRef::Method(_) => "Method",
            MemberRef::Field(_) => "Field",
            MemberRef::Property(_) => "Property",
            MemberRef::Event(_) => "Event",
        };
        write!(f, "{}({}, {})", kind, self.name(), self.token())
    }
}

impl From<CilTypeRc> for MemberRef {
    fn from(value: CilTypeRc) -> Self {
        MemberRef::Type(value)
    }
}

impl From<MethodRc> for MemberRef {
    fn from(value: MethodRc) -> Self {
        MemberRef::Method(value)
    }
}

impl From<FieldRc> for MemberRef {
    fn from(value: FieldRc) -> Self {
        MemberRef::Field(value)
    }
}

impl From<PropertyRc> for MemberRef {
    fn from(value: PropertyRc) -> Self {
        MemberRef::Property(value)
    }
}

impl From<EventRc> for MemberRef {
    fn from(value: EventRc) -> Self {
        MemberRef::Event(value)
    }
}
