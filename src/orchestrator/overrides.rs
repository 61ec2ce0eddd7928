// ABOUTME: Assembles value-file and key/value override arguments for a release.
// ABOUTME: Tier order is fixed; later arguments win inside the package tool.

use crate::command::{Arg, CommandRunner};
use crate::config::Release;
use crate::diagnostics::{Diagnostics, Warning};

use super::Orchestrator;

impl<R: CommandRunner> Orchestrator<R> {
    /// Override arguments for `release`, in precedence order:
    ///
    /// 1. run-level value files, as given
    /// 2. `values/<release>/default.yaml`, if present
    /// 3. the release's own value files, skipping missing ones with a warning
    /// 4. `values/<release>/<cluster>.yaml`, if the cluster is named and the file exists
    /// 5. key/value overrides as `--set` / `--set-file`, in declaration order
    pub fn overrides(&self, release: &Release, diag: &mut Diagnostics) -> Vec<Arg> {
        let mut args = Vec::new();

        for file in self.ctx.run_value_files() {
            let file = file.trim();
            if file.is_empty() {
                continue;
            }
            tracing::info!("Adding override file: {}", file);
            args.push(value_file_arg(file));
        }

        let default = self.ctx.default_values_file(&release.name);
        if default.is_file() {
            tracing::info!("Adding override file: {}", default.display());
            args.push(value_file_arg(default.display()));
        }

        for file in &release.value_files {
            let path = self.ctx.resolve(file);
            if !path.is_file() {
                diag.warn(Warning::missing_value_file(file));
                continue;
            }
            tracing::info!("Adding override file: {}", path.display());
            args.push(value_file_arg(path.display()));
        }

        if !self.config.name.is_empty() {
            let cluster = self
                .ctx
                .cluster_values_file(&release.name, &self.config.name);
            if cluster.is_file() {
                tracing::info!("Adding override file: {}", cluster.display());
                args.push(value_file_arg(cluster.display()));
            }
        }

        for item in &release.overrides {
            tracing::info!("Overriding value for: {}", item.target);
            if item.value.is_blank() {
                diag.warn(Warning::blank_override(&item.target));
            }
            args.push(item.to_arg());
        }

        args
    }
}

fn value_file_arg(path: impl std::fmt::Display) -> Arg {
    Arg::short("f", path.to_string())
}
