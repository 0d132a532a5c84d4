#![allow(unused)]
extern crate dotscope_lang;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dotscope_lang::prelude::*;
use std::{hint::black_box, path::PathBuf};

/// Build an assembly of `count` modules, each forwarding its entry point to the next one
///
/// Module locations are not on disk, so resolution uses a probe accepting every path.
fn forwarding_chain(count: u32) -> (AssemblyRc, Vec<ModuleRc>) {
    let assembly = AssemblyBuilder::new()
        .name("Chain")
        .version(AssemblyVersion::new(1, 0, 0, 0))
        .build()
        .unwrap();

    let mut modules = Vec::new();
    for index in 0..count {
        let location = PathBuf::from("/bench").join(format!("m{index}.netmodule"));
        let mut builder = ModuleBuilder::new()
            .name(format!("m{index}.netmodule"))
            .location(location);
        builder = if index + 1 == count {
            builder.native_entry_point(0x2000)
        } else {
            builder.entry_point_file(File::new(
                Token::new(0x2600_0001),
                format!("M{}.NETMODULE", index + 1),
            ))
        };

        let module = builder.build().unwrap();
        assembly.add_module(module.clone()).unwrap();
        modules.push(module);
    }

    (assembly, modules)
}

/// Benchmark entry point resolution along forwarding chains of increasing length
fn bench_resolve_entry_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_entry_point");
    for count in [1u32, 8, 64] {
        let (_assembly, modules) = forwarding_chain(count);
        let first = modules[0].clone();
        let probe = |_: &std::path::Path| true;

        group.bench_with_input(BenchmarkId::from_parameter(count), &first, |b, module| {
            b.iter(|| black_box(resolve_entry_point_with(black_box(module), &probe)));
        });
    }
    group.finish();
}

/// Benchmark writing a full header with global members and a managed entry point
fn bench_write_header(c: &mut Criterion) {
    let global = CilType::global(Token::new(0x0200_0001));
    for index in 0..32 {
        global.add_method(Method::new(
            Token::new(0x0600_0100 + index),
            format!("<Module>.helper{index}"),
        ));
    }

    let program = CilType::new(Token::new(0x0200_0002), "Contoso", "Program", 0);
    let main = Method::new(Token::new(0x0600_0001), "Main");
    program.add_method(main.clone());

    let module = ModuleBuilder::new()
        .name("App.exe")
        .machine(Machine::AMD64)
        .runtime_version("v4.0.30319")
        .timestamp(1_600_000_000)
        .global_type(global)
        .add_type(program)
        .entry_point_method(main)
        .build()
        .unwrap();
    let assembly = AssemblyBuilder::new().name("App").build().unwrap();
    assembly.add_module(module).unwrap();

    let language = SummaryLanguage::new();
    let options = DecompilationOptions {
        settings: DecompilerSettings {
            show_compiler_generated: true,
            show_tokens: false,
        },
        ..DecompilationOptions::default()
    };

    c.bench_function("write_module_assembly", |b| {
        b.iter(|| {
            let mut output = TokenOutput::new();
            language
                .write_module_assembly(
                    HeaderTarget::Assembly(&assembly),
                    &mut output,
                    &options,
                    DecompileAssemblyFlags::ASSEMBLY_AND_MODULE,
                )
                .unwrap();
            black_box(output)
        });
    });
}

criterion_group!(benches, bench_resolve_entry_point, bench_write_header);
criterion_main!(benches);
