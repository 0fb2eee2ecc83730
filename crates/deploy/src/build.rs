//! Runs the project's build command.

use std::path::Path;

use tokio::process::Command;
use tracing::info;

use crate::error::DeployError;

/// Runs `command` through the platform shell in `project_dir`.
pub async fn run_build_command(command: &str, project_dir: &Path) -> Result<(), DeployError> {
    let command = command.trim();
    if command.is_empty() {
        return Err(DeployError::Build("no build command configured".into()));
    }

    info!(command, dir = %project_dir.display(), "running build");

    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    };

    #[cfg(not(windows))]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    };

    let status = cmd.current_dir(project_dir).status().await?;
    if !status.success() {
        return Err(DeployError::Build(format!("`{command}` exited with {status}")));
    }

    info!("build completed");
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_command() {
        let dir = tempfile::tempdir().unwrap();
        run_build_command("mkdir -p build && echo hi > build/index.html", dir.path())
            .await
            .unwrap();
        assert!(dir.path().join("build").join("index.html").is_file());
    }

    #[tokio::test]
    async fn failing_command() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_build_command("exit 3", dir.path()).await.unwrap_err();
        assert!(matches!(err, DeployError::Build(_)));
    }

    #[tokio::test]
    async fn empty_command() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_build_command("  ", dir.path()).await.is_err());
    }
}
