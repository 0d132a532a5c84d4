//! Type definitions of a module.
//!
//! This module provides the [`CilType`] view used by the header emitter and by renderers:
//! the type's identity (namespace, name, enclosing type) and the members it declares.
//! Members hold a weak [`CilTypeRef`] back to their declaring type, so a type graph can be
//! shared freely between threads without reference cycles.
//!
//! # Examples
//!
//! ```rust
//! use dotscope_lang::metadata::{members::Method, token::Token, typesystem::CilType};
//!
//! let program = CilType::new(Token::new(0x02000002), "Contoso.App", "Program", 0);
//! program.add_method(Method::new(Token::new(0x06000001), "Main"));
//!
//! assert_eq!(program.fullname(), "Contoso.App.Program");
//! assert_eq!(program.methods.count(), 1);
//! ```

mod base;

use std::sync::{Arc, OnceLock};

pub use base::CilTypeRef;

use crate::metadata::{
    members::{EventList, EventRc, FieldList, FieldRc, MethodList, MethodRc, PropertyList, PropertyRc},
    token::Token,
};

/// A vector that holds a list of `CilType`
pub type CilTypeList = Arc<boxcar::Vec<CilTypeRc>>;
/// Reference to a `CilType`
pub type CilTypeRc = Arc<CilType>;

/// Name of the implicit type holding module-scope members
pub const GLOBAL_TYPE_NAME: &str = "<Module>";

/// A type definition of a module, together with the members it declares.
pub struct CilType {
    /// Token
    pub token: Token,
    /// `TypeNamespace` (can be empty, e.g. for the artificial `<Module>` (globals) type)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Flags (a 4-byte bitmask of type `TypeAttributes`, §II.23.1.15)
    pub flags: u32,
    /// The type this type is nested in
    enclosing: OnceLock<CilTypeRef>,
    /// All methods this type has
    pub methods: MethodList,
    /// All fields this type has
    pub fields: FieldList,
    /// All properties this type has
    pub properties: PropertyList,
    /// All events this type has
    pub events: EventList,
    /// All types that are 'contained' in this type
    pub nested_types: CilTypeList,
}

impl CilType {
    /// Create a new instance of a `CilType`
    pub fn new(
        token: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
        flags: u32,
    ) -> CilTypeRc {
        Arc::new(CilType {
            token,
            namespace: namespace.into(),
            name: name.into(),
            flags,
            enclosing: OnceLock::new(),
            methods: Arc::new(boxcar::Vec::new()),
            fields: Arc::new(boxcar::Vec::new()),
            properties: Arc::new(boxcar::Vec::new()),
            events: Arc::new(boxcar::Vec::new()),
            nested_types: Arc::new(boxcar::Vec::new()),
        })
    }

    /// Create the global `<Module>` type
    pub fn global(token: Token) -> CilTypeRc {
        Self::new(token, "", GLOBAL_TYPE_NAME, 0)
    }

    /// Returns true if this is the global `<Module>` type
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.namespace.is_empty() && self.name == GLOBAL_TYPE_NAME && self.enclosing().is_none()
    }

    /// The type this type is nested in, if any
    #[must_use]
    pub fn enclosing(&self) -> Option<CilTypeRc> {
        self.enclosing.get().and_then(CilTypeRef::upgrade)
    }

    /// Returns the full name of the entity
    ///
    /// Nested types are joined to their enclosing type with `/`, top-level types use
    /// `Namespace.Name` (or just `Name` in the global namespace).
    pub fn fullname(&self) -> String {
        if let Some(enclosing) = self.enclosing() {
            return format!("{}/{}", enclosing.fullname(), self.name);
        }

        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Number of members (methods, fields, properties and events) declared by this type
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.methods.count() + self.fields.count() + self.properties.count() + self.events.count()
    }

    /// Adds a method and makes this type its declaring type
    pub fn add_method(self: &Arc<Self>, method: MethodRc) {
        method.set_declaring_type(self);
        self.methods.push(method);
    }

    /// Adds a field and makes this type its declaring type
    pub fn add_field(self: &Arc<Self>, field: FieldRc) {
        field.set_declaring_type(self);
        self.fields.push(field);
    }

    /// Adds a property and makes this type its declaring type
    pub fn add_property(self: &Arc<Self>, property: PropertyRc) {
        property.set_declaring_type(self);
        self.properties.push(property);
    }

    /// Adds an event and makes this type its declaring type
    pub fn add_event(self: &Arc<Self>, event: EventRc) {
        event.set_declaring_type(self);
        self.events.push(event);
    }

    /// Nests `nested` inside this type
    ///
    /// A type can only be nested once, later calls keep the first enclosing type.
    pub fn add_nested_type(self: &Arc<Self>, nested: CilTypeRc) {
        let _ = nested.enclosing.set(CilTypeRef::new(self));
        self.nested_types.push(nested);
    }
}
