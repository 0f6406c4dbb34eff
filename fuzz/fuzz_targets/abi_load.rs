#![no_main]

use std::fs;
use std::path::Path;

use abicodec::{register, AbiDef};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(abi) = AbiDef::from_json(text) {
                let _ = register(&abi);
            }
        }
        let Ok(abi) = AbiDef::from_bin(data) else {
            return;
        };
        // A decoded ABI must re-encode, whether or not it registers.
        if let Ok(bytes) = abi.to_bin() {
            assert_eq!(AbiDef::from_bin(&bytes).ok().as_ref(), Some(&abi));
        }
        let _ = register(&abi);
    }));

    if result.is_err() {
        record_panic("abi_load", data);
    }
});

fn record_panic(target: &str, data: &[u8]) {
    let hash = fnv1a64(data);
    let dir = Path::new("fuzz").join("artifacts").join(target);
    if let Err(err) = fs::create_dir_all(&dir) {
        eprintln!("fuzz panic capture failed: target={} err={}", target, err);
        return;
    }
    let path = dir.join(format!("panic_{:016x}.bin", hash));
    if let Err(err) = fs::write(&path, data) {
        eprintln!(
            "fuzz panic capture failed: target={} path={} err={}",
            target,
            path.display(),
            err
        );
        return;
    }
    eprintln!(
        "fuzz panic captured: target={} path={} len={}",
        target,
        path.display(),
        data.len()
    );
}

fn fnv1a64(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
