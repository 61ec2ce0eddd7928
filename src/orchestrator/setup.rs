// ABOUTME: One-time run setup: kubeconfig file, context selection, chart repositories.
// ABOUTME: Runs before any release is touched; failures here abort the whole run.

use std::io::Write;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::command::{Arg, CommandBuilder, CommandRunner};
use crate::config::RepoConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};

use super::Orchestrator;

impl<R: CommandRunner> Orchestrator<R> {
    /// Write the supplied kubeconfig and switch to the requested context.
    pub async fn setup_kubeconfig(&mut self) -> Result<()> {
        if self.config.package.skip_setup_kube_config {
            tracing::info!("Skipping kube config setup");
            return Ok(());
        }

        if let Some(contents) = self.ctx.kube_config_contents() {
            let bytes = if self.ctx.is_kube_config_base64() {
                STANDARD.decode(contents.trim())?
            } else {
                contents.as_bytes().to_vec()
            };
            let path = self.ctx.kubeconfig_target();
            write_private(&path, &bytes).map_err(|source| Error::KubeconfigWrite {
                path: path.clone(),
                source,
            })?;
            tracing::info!("Kube config written to: {}", path.display());
            self.ctx.set_kubeconfig_file(path);
        }

        if let Some(context) = self.ctx.context_name() {
            tracing::info!("Setting Kubernetes context: {}", context);
            let mut cmd = self.kubectl().args([
                Arg::raw("config"),
                Arg::raw("use-context"),
                Arg::raw(context),
            ]);
            if let Some(path) = self.ctx.kubeconfig_file() {
                cmd.push(Arg::long("kubeconfig", path.display().to_string()));
            }
            self.runner.run(&cmd).await.map_err(Error::KubeContext)?;
        }
        Ok(())
    }

    /// Register every configured chart repository, then refresh the index.
    pub async fn setup_repos(&self, diag: &mut Diagnostics) -> Result<()> {
        let package = &self.config.package;
        if package.skip_setup_helm_repo {
            tracing::info!("Skipping helm repo setup");
            return Ok(());
        }
        if package.repos.is_empty() {
            return Ok(());
        }

        for repo in &package.repos {
            tracing::info!("Adding helm repo: {}", repo.name);
            let cmd = self.repo_add_command(repo, diag)?;
            self.runner
                .run(&cmd)
                .await
                .map_err(|source| Error::RepoAdd {
                    name: repo.name.clone(),
                    source,
                })?;
        }

        let update = self.helm().args([Arg::raw("repo"), Arg::raw("update")]);
        self.runner.run(&update).await.map_err(Error::RepoUpdate)
    }

    /// `repo add` for one repository. Credentials are always redacted.
    pub fn repo_add_command(
        &self,
        repo: &RepoConfig,
        diag: &mut Diagnostics,
    ) -> Result<CommandBuilder> {
        let mut cmd = self.helm().args([
            Arg::raw("repo"),
            Arg::raw("add"),
            Arg::raw(&repo.name),
            Arg::raw(&repo.url),
        ]);
        let credentials = [("username", &repo.username), ("password", &repo.password)];
        for (flag, value) in credentials {
            let Some(value) = value else { continue };
            let resolved = value.resolve().map_err(|source| Error::RepoCredential {
                name: repo.name.clone(),
                source,
            })?;
            if resolved.is_empty() {
                diag.warn(Warning::blank_credential(&repo.name, flag));
            }
            cmd.push(Arg::long(flag, resolved).secret(true));
        }
        Ok(cmd)
    }
}

/// Write `bytes` to `path` readable by the owner only, creating parent directories.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // mode() only applies on creation
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(bytes)
    }

    #[cfg(not(unix))]
    {
        std::fs::File::create(path)?.write_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_private_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/.kube/config-test");
        write_private(&path, b"apiVersion: v1\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"apiVersion: v1\n");
    }

    #[cfg(unix)]
    #[test]
    fn write_private_restricts_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, b"new").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
