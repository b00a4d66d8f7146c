//! Hermetic scratch directory for running the `pcb-bom` binary in tests.
//!
//! - Everything lives under an `assert_fs::TempDir` and is cleaned up on drop
//! - `HOME` points inside the sandbox and `RUST_LOG` is cleared
//! - Run cargo binaries with `run` / `run_err`; `cwd` is relative to the sandbox root
//!
//! ## Quick example
//! ```no_run
//! use pcb_test_utils::sandbox::Sandbox;
//!
//! let mut sb = Sandbox::new();
//! sb.write("pcb-bom.toml", "projects = [\"board\"]\n");
//!
//! let output = sb.run("pcb-bom", ["merge", "--dry-run"], None).unwrap();
//! println!("{output}");
//! assert!(sb.read("master_bom.csv").is_none());
//! ```

use assert_fs::TempDir;
use assert_fs::fixture::PathChild;
use duct::Expression;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Sandbox {
    root: TempDir,
    pub home: PathBuf,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of a command that was expected to fail.
#[derive(Debug)]
pub struct Failure {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Sandbox {
    /// Create a new sandbox; all state is under an auto-cleaned TempDir.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        let home = root.child("home").to_path_buf();
        fs::create_dir_all(&home).expect("create home dir");

        Self { root, home }
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write/overwrite a file relative to the sandbox root.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.root_path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Read a file relative to the sandbox root, `None` if it does not exist.
    pub fn read<P: AsRef<Path>>(&self, rel: P) -> Option<String> {
        fs::read_to_string(self.root_path().join(rel)).ok()
    }

    fn cargo_cmd<I>(&self, program: &str, args: I, cwd: Option<&Path>) -> Expression
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program)
            .to_string_lossy()
            .to_string();
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().to_string())
            .collect();

        let working_dir = match cwd {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => self.root_path().join(dir),
            None => self.root_path().to_path_buf(),
        };

        self.inject_env(duct::cmd(&cargo_bin_path, args).dir(working_dir))
    }

    /// Run a cargo binary inside this sandbox and return stdout as String.
    /// Errors if the process exits with non-zero status.
    pub fn run<I>(&self, program: &str, args: I, cwd: Option<&Path>) -> Result<String, String>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.cargo_cmd(program, args, cwd)
            .read()
            .map_err(|e| format!("command failed: {e}"))
    }

    /// Run a cargo binary that is expected to fail and capture both streams.
    /// Panics if the process succeeds.
    pub fn run_err<I>(&self, program: &str, args: I, cwd: Option<&Path>) -> Failure
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let output = self
            .cargo_cmd(program, args, cwd)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .expect("spawn command");

        assert!(
            !output.status.success(),
            "expected {program} to fail, stdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        );

        Failure {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    fn inject_env(&self, mut expr: Expression) -> Expression {
        let mut env_map: HashMap<String, String> = HashMap::new();
        if let Ok(path) = std::env::var("PATH") {
            env_map.insert("PATH".into(), path);
        }
        env_map.insert("HOME".into(), self.home.to_string_lossy().into_owned());
        env_map.insert(
            "XDG_CONFIG_HOME".into(),
            self.home.to_string_lossy().into_owned(),
        );
        env_map.insert("NO_COLOR".into(), "1".into());

        expr = expr.full_env(&env_map);

        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_relative_to_root() {
        let mut sb = Sandbox::new();

        sb.write("boards/a.csv", "a").write("boards/b.csv", "b");

        assert!(sb.root_path().join("boards/a.csv").is_file());
        assert_eq!(sb.read("boards/b.csv").as_deref(), Some("b"));
        assert_eq!(sb.read("boards/missing.csv"), None);
        assert!(sb.home.starts_with(sb.root_path()));
        assert!(sb.home.is_dir());
    }
}
