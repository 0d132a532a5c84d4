//! Factories shared by the unit tests of this crate.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::metadata::{
    assembly::{AssemblyBuilder, AssemblyRc},
    members::{Event, EventRc, Field, FieldRc, Method, MethodRc, Property, PropertyRc},
    module::{File, FileRc, Machine, ModuleBuilder, ModuleRc},
    token::Token,
    typesystem::{CilType, CilTypeRc},
};

static NEXT_ROW: AtomicU32 = AtomicU32::new(1);

fn next_token(table: u8) -> Token {
    Token::from_parts(table, NEXT_ROW.fetch_add(1, Ordering::Relaxed))
}

// Helper function to create a TypeDef
pub fn create_type(namespace: &str, name: &str) -> CilTypeRc {
    CilType::new(next_token(Token::TYPE_DEF), namespace, name, 0)
}

// Helper function to create the global <Module> type
pub fn create_global_type() -> CilTypeRc {
    CilType::global(Token::from_parts(Token::TYPE_DEF, 1))
}

// Helper function to create a Method
pub fn create_method(name: &str) -> MethodRc {
    Method::with_rva(next_token(Token::METHOD_DEF), name, 0x2050)
}

// Helper function to create a Field
pub fn create_field(name: &str) -> FieldRc {
    Field::new(next_token(Token::FIELD), name)
}

// Helper function to create a Property
pub fn create_property(name: &str) -> PropertyRc {
    Property::new(next_token(Token::PROPERTY), name)
}

// Helper function to create an Event
pub fn create_event(name: &str) -> EventRc {
    Event::new(next_token(Token::EVENT), name)
}

// Helper function to create a File
pub fn create_file(rid: u32, name: &str) -> FileRc {
    File::new(Token::from_parts(Token::FILE, rid), name)
}

// Helper function to create a method declared by `Namespace.Type`; the type must be kept alive
pub fn create_declared_method(namespace: &str, type_name: &str, name: &str) -> (CilTypeRc, MethodRc) {
    let ty = create_type(namespace, type_name);
    let method = create_method(name);
    ty.add_method(method.clone());
    (ty, method)
}

// Helper function to create an in-memory module
pub fn create_module(name: &str) -> ModuleRc {
    ModuleBuilder::new()
        .name(name)
        .machine(Machine::I386)
        .runtime_version("v4.0.30319")
        .build()
        .unwrap()
}

// Helper function to create an assembly owning `modules`
pub fn create_assembly(name: &str, modules: &[ModuleRc]) -> AssemblyRc {
    let assembly = AssemblyBuilder::new().name(name).build().unwrap();
    for module in modules {
        assembly.add_module(module.clone()).unwrap();
    }
    assembly
}
