//! Container engine configuration for buildchain.
//!
//! Turns a [`ContainerRun`] into the create-container request understood by
//! the Docker engine API.

use bollard::container::Config;
use bollard::models::HostConfig;
use buildchain_core::container::ContainerRun;
use tracing::debug;

pub use buildchain_core::container::{BindMount, ENTRYPOINT_PATH};

/// Build the engine request for `run`.
pub fn to_container_config(run: &ContainerRun) -> Config<String> {
    let binds = run.binds();
    let host_config = HostConfig {
        binds: if binds.is_empty() { None } else { Some(binds) },
        ..Default::default()
    };

    let cmd = if run.command.is_empty() {
        None
    } else {
        Some(run.command.clone())
    };

    let env: Vec<String> = run
        .env
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    debug!(
        image = %run.image,
        mounts = run.mounts.len(),
        "Assembled container config"
    );

    Config {
        image: Some(run.image.clone()),
        cmd,
        env: if env.is_empty() { None } else { Some(env) },
        working_dir: run
            .working_dir
            .as_ref()
            .map(|dir| dir.display().to_string()),
        attach_stdout: Some(true),
        attach_stderr: Some(true),
        tty: Some(false),
        host_config: Some(host_config),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entrypoint_run() {
        let run = ContainerRun::new("node:16")
            .unwrap()
            .entrypoint("/tmp/build/entrypoint.sh")
            .mount(BindMount::new("/src/ui", "/home/node/ui"))
            .env("NODE_ENV", "production")
            .env("CI", "1")
            .working_dir("/home/node/ui");

        let config = to_container_config(&run);
        assert_eq!(config.image.as_deref(), Some("node:16"));
        assert_eq!(config.cmd, Some(vec![ENTRYPOINT_PATH.to_string()]));
        assert_eq!(
            config.env,
            Some(vec!["NODE_ENV=production".to_string(), "CI=1".to_string()])
        );
        assert_eq!(config.working_dir.as_deref(), Some("/home/node/ui"));

        let binds = config.host_config.unwrap().binds.unwrap();
        assert_eq!(
            binds,
            vec![
                "/tmp/build/entrypoint.sh:/entrypoint.sh:ro".to_string(),
                "/src/ui:/home/node/ui:rw".to_string(),
            ]
        );
    }

    #[test]
    fn test_bare_run() {
        let config = to_container_config(&ContainerRun::new("alpine").unwrap());
        assert_eq!(config.cmd, None);
        assert_eq!(config.env, None);
        assert_eq!(config.working_dir, None);
        assert_eq!(config.host_config.unwrap().binds, None);
    }
}
