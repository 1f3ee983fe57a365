//! Loader failures surface every broken configuration layer at once.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoError;
use tempfile::TempDir;

use recast_config::{Config, ConfigError, ENV_CONFIG_PATH};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = std::env::var_os(key);
        // Environment mutation is unsafe on the 2024 edition; the mutex keeps
        // the tests in this binary from racing on it.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap_or_else(|error| panic!("write {name}: {error}"));
    path
}

#[test]
fn malformed_configs_return_aggregated_error() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let cli_path = write(&temp_dir, "cli_recast.toml", "max_passes = [1,");
    let env_path = write(&temp_dir, "env_recast.toml", "log_format = compact");

    let _env = EnvOverride::set_var(ENV_CONFIG_PATH, env_path.as_os_str());

    let args = vec![
        OsString::from("recast"),
        OsString::from("--config-path"),
        cli_path.clone().into_os_string(),
    ];

    let error = Config::resolve_from_iter(args).expect_err("loading must fail");
    assert!(
        error.to_string().contains("multiple configuration errors"),
        "expected aggregate message, got {error}"
    );

    let loader = match error.loader_error() {
        Some(loader) => loader,
        None => panic!("expected a loader error, got {error:?}"),
    };
    match loader.as_ref() {
        OrthoError::Aggregate(aggregate) => {
            let mut mentioned_paths = aggregate
                .iter()
                .filter_map(|err| match err {
                    OrthoError::File { path, .. } => Some(path.clone()),
                    _ => None,
                })
                .collect::<Vec<_>>();
            mentioned_paths.sort();

            assert_eq!(
                mentioned_paths.len(),
                2,
                "expected both failing files to be reported, got {mentioned_paths:?}"
            );
            assert!(mentioned_paths.contains(&cli_path));
            assert!(mentioned_paths.contains(&env_path));
        }
        other => panic!("expected aggregated error, got {other:?}"),
    }
}

#[test]
fn valid_file_with_out_of_domain_value_fails_validation() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = write(&temp_dir, "recast.toml", "worker_threads = 0\n");

    let _env = EnvOverride::set_var(ENV_CONFIG_PATH, path.as_os_str());

    let error = Config::resolve_from_iter([OsString::from("recast")])
        .expect_err("validation must fail");
    assert!(matches!(error, ConfigError::InvalidValue { .. }));
    assert_eq!(error.key(), Some("worker_threads"));
}
