// benches/interception_bench.rs
//! Interceptor dispatch overhead: rule hit vs. pass-through

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use devopt_override_engine::interception::{
    Accessor, AccessorCall, AccessorSignature, AccessorValue, MemoryRuntime, PropertyReader, SettingReader,
    SettingsNamespace,
};
use devopt_override_engine::{EngineConfig, OverrideModule};

fn activated_runtime() -> MemoryRuntime {
    let mut host = MemoryRuntime::new(devopt_override_engine::utils::config::DEFAULT_TARGET_PROCESS)
        .with_preferences("{}")
        .with_property("ro.build.type", "user")
        .with_setting(SettingsNamespace::Global, "adb_enabled", "1");

    let mut module = OverrideModule::new(EngineConfig::default());
    module.activate(&mut host);
    host
}

fn bench_dispatch(c: &mut Criterion) {
    let host = activated_runtime();

    let get_int = host.current(AccessorSignature::Setting(
        SettingsNamespace::Global,
        SettingReader::GetIntWithDefault,
    ));
    let hit = AccessorCall::new("adb_enabled").with_default(AccessorValue::Int(1));
    c.bench_function("setting_rule_hit", |b| {
        b.iter(|| get_int.call(black_box(&hit)))
    });

    let get = host.current(AccessorSignature::Property(PropertyReader::Get));
    let miss = AccessorCall::new("ro.build.type");
    c.bench_function("property_pass_through", |b| {
        b.iter(|| get.call(black_box(&miss)))
    });

    let genuine = host.genuine(AccessorSignature::Property(PropertyReader::Get));
    c.bench_function("property_unhooked", |b| {
        b.iter(|| genuine.call(black_box(&miss)))
    });
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
