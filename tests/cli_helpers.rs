#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::str::FromStr;
use tempfile::TempDir;

pub const LOTS_CSV: &str = "date,quantity,price\n2021-01-01,10,1000\n2021-06-01,5,2000\n";

pub const REWARD_CACHE: &str = r#"{
    "16000000": {
        "date": "10-01-2022",
        "closingPrice": 3000,
        "transactions": [
            { "timeStamp": 1641816000, "hash": "0x01", "taxable": true, "ethValue": 0.5 }
        ],
        "withdrawals": [
            { "timeStamp": 1641830000, "withdrawalIndex": 42, "ethValue": 0.25 }
        ]
    },
    "16100000": {
        "date": "15-02-2022",
        "closingPrice": 2900,
        "transactions": [
            { "timeStamp": 1644926400, "hash": "0x02", "taxable": true, "ethValue": 1.5 },
            { "timeStamp": 1644926500, "hash": "0x03", "taxable": false, "ethValue": 10 }
        ]
    }
}"#;

pub fn write_file(home: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = home.path().join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is not UTF-8")
}

/// Binary isolated from any real user config
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("ethbasis"));
    cmd.current_dir(home.path());
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd.env_remove("ETHBASIS_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let output = run_cmd(home, args)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

/// Read a decimal that may be serialized as a string or a number
pub fn decimal_from_value(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("invalid decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("invalid decimal number"),
        other => panic!("not a decimal: {:?}", other),
    }
}
