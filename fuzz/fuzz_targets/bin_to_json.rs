#![no_main]

use std::fs;
use std::path::Path;

use abicodec::{register, AbiDef, TypeRegistry};
use libfuzzer_sys::fuzz_target;

thread_local! {
    static TRANSACTIONS: Option<TypeRegistry> = register(&AbiDef::transaction_schema()).ok();
}

fuzz_target!(|data: &[u8]| {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        TRANSACTIONS.with(|registry| {
            let Some(transaction) = registry.as_ref().and_then(|r| r.handle("transaction")) else {
                return;
            };
            let Ok(json) = transaction.bin_to_json(data) else {
                return;
            };
            // Non-minimal varuints decode, so compare the JSON after a re-encode.
            let bytes = transaction.json_to_bin(&json).ok();
            let again = bytes.and_then(|bytes| transaction.bin_to_json(&bytes).ok());
            assert_eq!(again.as_deref(), Some(json.as_str()));
        });
    }));

    if result.is_err() {
        record_panic("bin_to_json", data);
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
