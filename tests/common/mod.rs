#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Four bytes `DE AD BE EF` at address 0.
pub const SINGLE_RECORD: &str = ":04000000DEADBEEFC4\n:00000001FF\n";

/// `AA BB` at 0x0000 and `CC DD` at 0x1000.
pub const TWO_SEGMENTS: &str = ":02000000AABB99\n:02100000CCDD35\n:00000001FF\n";

/// Eight bytes at 0x0000 and four at 0x0010.
pub const SCENARIO_TWO: &str = ":080000000102030405060708D4\n:04001000AABBCCDDDE\n:00000001FF\n";

/// Vector table: SP 0x20001000, reset word 0x08000001.
pub const VECTOR_TABLE: &str = ":080000000010002001000008BF\n:00000001FF\n";

/// Vector table pointing at 0x100, then `push {r4, lr}`, `"Hello, fw!\0"` and
/// `bx lr` at 0x100, plus a start linear address record.
pub const WITH_STRING: &str = ":080000000010002001010000C6\n\
                               :0F01000010B548656C6C6F2C2066772100704736\n\
                               :0400000500000101F5\n\
                               :00000001FF\n";

pub fn temp_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut dir = std::env::temp_dir();
    dir.push(format!("fwscan_{prefix}_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(path: &Path, data: &[u8]) {
    std::fs::write(path, data).unwrap();
}

pub fn arg(path: &Path) -> String {
    path.display().to_string()
}

pub fn run_fwscan(args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fwscan"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("FWSCAN_CONFIG")
        .output()
        .unwrap()
}

pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("fwscan failed: {stderr}");
    }
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn read_text(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}
