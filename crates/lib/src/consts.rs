//! Crate-wide constants.

pub const APP_NAME: &str = "vitu";

/// Length of the truncated hash naming a job's artifact directory.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Backend used when the caller does not name one.
pub const DEFAULT_BACKEND: &str = "v";

/// Target directory used when the caller does not name one.
pub const DEFAULT_TARGET_DIR: &str = "build";

/// Status returned by a failed transpile or build.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Status returned by `run` when the pipeline failed before the program executed.
pub const PIPELINE_FAILURE_CODE: i32 = -1;

/// Environment variable naming the V installation root.
pub const VLANG_ROOT_VAR: &str = "VLANG_ROOT";

/// Environment variable naming the Go installation root.
pub const GOROOT_VAR: &str = "GOROOT";
