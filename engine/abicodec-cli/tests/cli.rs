use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const TRANSFER_HEX: &str = "0000000000855C340000000000000E3D102700000000000004454F5300000000026869";
const TRANSFER_JSON: &str = r#"{"from":"alice","to":"bob","quantity":"1.0000 EOS","memo":"hi"}"#;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_str(name: &str) -> String {
    fixture_path(name).to_str().unwrap().to_string()
}

#[test]
fn json2bin_accepts_any_field_order_by_default() {
    cargo_bin_cmd!("abicodec")
        .args([
            "json2bin",
            "--abi",
            &fixture_str("token_abi.json"),
            "--contract",
            "eosio.token",
            "--action",
            "transfer",
            &fixture_str("transfer.json"),
        ])
        .assert()
        .success()
        .stdout(format!("{TRANSFER_HEX}\n"));
}

#[test]
fn json2bin_strict_rejects_reordered_fields() {
    cargo_bin_cmd!("abicodec")
        .args([
            "json2bin",
            "--strict",
            "--abi",
            &fixture_str("token_abi.json"),
            "--type",
            "transfer",
            &fixture_str("transfer.json"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transfer is missing field from"));
}

#[test]
fn bin2json_reads_stdin_with_a_binary_abi() {
    cargo_bin_cmd!("abicodec")
        .args([
            "bin2json",
            "--abi",
            &fixture_str("token_abi.hex"),
            "--type",
            "transfer",
            "-",
        ])
        .write_stdin(format!("{TRANSFER_HEX}\n"))
        .assert()
        .success()
        .stdout(format!("{TRANSFER_JSON}\n"));
}

#[test]
fn unknown_action_is_reported() {
    cargo_bin_cmd!("abicodec")
        .args([
            "json2bin",
            "--abi",
            &fixture_str("token_abi.json"),
            "--contract",
            "eosio.token",
            "--action",
            "retire",
            &fixture_str("transfer.json"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "contract \"eosio.token\" does not have action \"retire\"",
        ));
}

#[test]
fn type_and_action_are_mutually_exclusive() {
    cargo_bin_cmd!("abicodec")
        .args([
            "bin2json",
            "--abi",
            &fixture_str("token_abi.json"),
            "--type",
            "transfer",
            "--action",
            "transfer",
            "-",
        ])
        .assert()
        .failure();
}

#[test]
fn abi_round_trips_between_json_and_binary() {
    let expected_hex = fs::read_to_string(fixture_path("token_abi.hex")).unwrap();
    let output = cargo_bin_cmd!("abicodec")
        .args(["json2abi", &fixture_str("token_abi.json")])
        .output()
        .unwrap();
    assert!(output.status.success(), "json2abi failed: {:?}", output);
    let hex = String::from_utf8(output.stdout).unwrap();
    assert_eq!(hex.trim(), expected_hex.trim().to_uppercase());

    let tmp = TempDir::new().unwrap();
    let hex_path = tmp.path().join("abi.hex");
    fs::write(&hex_path, &hex).unwrap();
    cargo_bin_cmd!("abicodec")
        .args(["abi2json", hex_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": \"eosio::abi/1.0\""))
        .stdout(predicate::str::contains("\"new_type_name\": \"account_name\""));
}

#[test]
fn abi2json_rejects_bad_hex() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("abi.hex");
    fs::write(&path, "not hex").unwrap();
    cargo_bin_cmd!("abicodec")
        .args(["abi2json", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid hex input"));
}

#[test]
fn key_prints_the_canonical_form() {
    cargo_bin_cmd!("abicodec")
        .args(["key", "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV"])
        .assert()
        .success()
        .stdout("public_key K1 PUB_K1_6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5BoDq63\n");
}

#[test]
fn key_rejects_bad_checksums() {
    cargo_bin_cmd!("abicodec")
        .args(["key", "PUB_K1_6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5BoDq64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("checksum doesn't match"));
}
