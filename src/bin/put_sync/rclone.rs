//! External transfer tool adapter.
//!
//! All remote access goes through the [`Remote`] trait.
//! [`Rclone`] runs the `rclone` binary against a configured remote.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

use crate::types::Item;

const RCLONE: &str = "rclone";

/// Remote namespace that can be listed, copied from, and purged.
pub trait Remote {
    /// Snapshot of the remote hierarchy, limited to `max_depth` levels.
    fn list(&mut self, max_depth: usize) -> Result<Vec<Item>>;

    /// Copy a remote path into a local directory.
    fn copy(&mut self, source: &str, destination: &Path) -> Result<()>;

    /// Remove a remote path. Directories are removed recursively.
    fn purge(&mut self, path: &str, is_dir: bool) -> Result<()>;
}

/// Runs `rclone` against a named remote.
#[derive(Debug)]
pub struct Rclone {
    remote: String,
}

impl Rclone {
    /// Create a new adapter after checking that `rclone` can be executed.
    pub(crate) fn new(remote: &str) -> Result<Self> {
        Self::check_installed()?;
        Ok(Self::with_remote(remote))
    }

    /// Accepts the remote name with or without the trailing colon.
    fn with_remote(remote: &str) -> Self {
        Self {
            remote: remote.trim_end_matches(':').to_string(),
        }
    }

    fn check_installed() -> Result<()> {
        let output = Command::new(RCLONE).arg("version").output();
        match output {
            Ok(output) if output.status.success() => Ok(()),
            _ => bail!("rclone not found. Install rclone first and make sure it is in PATH"),
        }
    }

    /// Full remote path, for example `putio:Foo/movie.mkv`.
    fn remote_path(&self, path: &str) -> String {
        format!("{}:{path}", self.remote)
    }

    fn list_command(&self, max_depth: usize) -> Command {
        let mut command = Command::new(RCLONE);
        command
            .args(["lsjson", "--recursive", "--max-depth"])
            .arg(max_depth.to_string())
            .arg(self.remote_path(""));
        command
    }

    fn copy_command(&self, source: &str, destination: &Path) -> Command {
        let mut command = Command::new(RCLONE);
        command
            .args(["copy", "--progress"])
            .arg(self.remote_path(source))
            .arg(destination);
        command
    }

    fn purge_command(&self, path: &str, is_dir: bool) -> Command {
        let mut command = Command::new(RCLONE);
        command.arg(delete_subcommand(is_dir)).arg(self.remote_path(path));
        command
    }

    /// Run an rclone command with inherited output and fail on a non-zero exit.
    fn run_inherited(mut command: Command, description: &str) -> Result<()> {
        let status = command
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute rclone {description}"))?;

        if !status.success() {
            bail!("rclone {description} failed with {status}");
        }
        Ok(())
    }
}

impl Remote for Rclone {
    fn list(&mut self, max_depth: usize) -> Result<Vec<Item>> {
        let output = self
            .list_command(max_depth)
            .output()
            .context("Failed to execute rclone lsjson")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("rclone lsjson failed: {}", stderr.trim());
        }

        parse_listing(&String::from_utf8_lossy(&output.stdout))
    }

    fn copy(&mut self, source: &str, destination: &Path) -> Result<()> {
        Self::run_inherited(self.copy_command(source, destination), "copy")
    }

    fn purge(&mut self, path: &str, is_dir: bool) -> Result<()> {
        Self::run_inherited(self.purge_command(path, is_dir), delete_subcommand(is_dir))
    }
}

/// Directories are removed recursively, files one at a time.
const fn delete_subcommand(is_dir: bool) -> &'static str {
    if is_dir { "purge" } else { "deletefile" }
}

/// Parse `rclone lsjson` output into items, keeping the listing order.
pub fn parse_listing(json: &str) -> Result<Vec<Item>> {
    serde_json::from_str(json).context("Failed to parse rclone lsjson output")
}



#[cfg(test)]
mod test_rclone_commands {
    use std::path::PathBuf;

    use super::*;

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn trailing_colon_is_trimmed_from_remote() {
        assert_eq!(Rclone::with_remote("putio:").remote_path("Foo"), "putio:Foo");
        assert_eq!(Rclone::with_remote("putio").remote_path(""), "putio:");
    }

    #[test]
    fn list_command_lists_recursively_to_depth() {
        let command = Rclone::with_remote("putio").list_command(5);
        assert_eq!(command.get_program(), RCLONE);
        assert_eq!(args(&command), vec!["lsjson", "--recursive", "--max-depth", "5", "putio:"]);
    }

    #[test]
    fn copy_command_copies_into_destination() {
        let destination = PathBuf::from("/media/Movies/Foo Movie");
        let command = Rclone::with_remote("putio").copy_command("Foo/movie.mkv", &destination);
        assert_eq!(command.get_program(), RCLONE);
        assert_eq!(
            args(&command),
            vec!["copy", "--progress", "putio:Foo/movie.mkv", "/media/Movies/Foo Movie"]
        );
    }

    #[test]
    fn folders_are_purged_and_files_deleted() {
        let rclone = Rclone::with_remote("putio");
        assert_eq!(args(&rclone.purge_command("Foo", true)), vec!["purge", "putio:Foo"]);
        assert_eq!(
            args(&rclone.purge_command("Foo/movie.mkv", false)),
            vec!["deletefile", "putio:Foo/movie.mkv"]
        );
    }
}
