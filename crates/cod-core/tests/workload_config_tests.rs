use std::fs;

use cod_core::config::load_workloads;
use cod_core::models::error::ConfigError;

fn write_workload(dir: &std::path::Path, filename: &str, contents: &str) {
    fs::write(dir.join(filename), contents).unwrap();
}

#[test]
fn loads_a_minimal_workload_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_workload(
        dir.path(),
        "echo.yml",
        r#"
version: cod:config/v1
path: /echo/**
image: hashicorp/http-echo
port: 5678
"#,
    );

    let workloads = load_workloads(dir.path()).unwrap();
    assert_eq!(workloads.len(), 1);
    let w = &workloads[0];
    assert_eq!(w.name, "echo");
    assert_eq!(w.host_address, "127.0.0.1");
    assert_eq!(w.host_port, 0);
    assert_eq!(w.memory_limit_bytes, 20 * 1024 * 1024);
    assert_eq!(w.cpu_share, 10);
    assert_eq!(w.max_idle_time.as_secs(), 30);
}

#[test]
fn explicit_fields_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_workload(
        dir.path(),
        "custom.yml",
        r#"
version: cod:config/v1
name: custom-name
path: /custom/**
image: nginx:latest
port: 80
hostAddress: 0.0.0.0
hostPort: 9090
memory: 128MB
cpu: 50
maxIdleTime: 2m
"#,
    );

    let workloads = load_workloads(dir.path()).unwrap();
    let w = &workloads[0];
    assert_eq!(w.name, "custom-name");
    assert_eq!(w.host_address, "0.0.0.0");
    assert_eq!(w.host_port, 9090);
    assert_eq!(w.memory_limit_bytes, 128_000_000);
    assert_eq!(w.cpu_share, 50);
    assert_eq!(w.max_idle_time.as_secs(), 120);
}

#[test]
fn rejects_wrong_version() {
    let dir = tempfile::tempdir().unwrap();
    write_workload(
        dir.path(),
        "old.yml",
        r#"
version: cod:config/v0
path: /old/**
image: nginx
port: 80
"#,
    );

    let err = load_workloads(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn rejects_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    write_workload(
        dir.path(),
        "typo.yml",
        r#"
version: cod:config/v1
path: /typo/**
image: nginx
port: 80
memry: 10MB
"#,
    );

    let err = load_workloads(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }));
}

#[test]
fn walks_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("team-a");
    fs::create_dir(&nested).unwrap();
    write_workload(
        &nested,
        "svc.yaml",
        r#"
version: cod:config/v1
path: /svc/**
image: nginx
port: 80
"#,
    );

    let workloads = load_workloads(dir.path()).unwrap();
    assert_eq!(workloads.len(), 1);
    assert_eq!(workloads[0].name, "svc");
}
