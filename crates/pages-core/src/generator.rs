//! Adapter around the external static-site generator
//!
//! The generator is an opaque executable invoked per site directory:
//! `generate` turns the source tree into the artifact tree, `server`
//! serves a local preview until stopped. Its effective configuration is
//! read synchronously from the site's `_config.yml`; the artifact
//! directory is always taken from there, never assumed.

use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};

use pages_fs::{ConfigStore, NormalizedPath};

use crate::{Error, Result};

const SITE_CONFIG_NAME: &str = "_config.yml";

/// Effective generator configuration for one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Executable (plus leading arguments) to invoke.
    pub command: String,
    /// Source tree, relative to the site directory.
    pub source_dir: String,
    /// Output tree, relative to the site directory.
    pub public_dir: String,
    /// Preview server port.
    pub port: u16,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: "hexo".to_string(),
            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            port: 4000,
        }
    }
}

/// A running preview server.
///
/// The child process is killed when the handle is stopped or dropped.
pub struct ServerHandle {
    child: Option<Child>,
    address: String,
}

impl ServerHandle {
    /// The address the preview is reachable on.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Stop the server and reap the process.
    pub fn stop(mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            child.kill().ok();
            child.wait().map_err(Error::Io)?;
        }
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            child.kill().ok();
            child.wait().ok();
        }
    }
}

/// Invokes the external generator and reads its configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeneratorAdapter;

impl GeneratorAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Read the site's effective generator configuration.
    ///
    /// A missing `_config.yml` yields the defaults; unknown keys in a
    /// present one are ignored.
    pub fn read_config(&self, site_dir: &NormalizedPath) -> Result<GeneratorConfig> {
        let path = site_dir.join(SITE_CONFIG_NAME);
        let config: Option<GeneratorConfig> = ConfigStore::new().load_optional(&path)?;
        Ok(config.unwrap_or_default())
    }

    /// The artifact directory for a site, per its configuration.
    pub fn artifact_dir(&self, site_dir: &NormalizedPath) -> Result<NormalizedPath> {
        let config = self.read_config(site_dir)?;
        Ok(site_dir.join(&config.public_dir))
    }

    /// Run the generator's build step for a site.
    ///
    /// The artifact directory is left in its pre-build state when the
    /// generator fails; nothing is published.
    pub fn generate(&self, site_dir: &NormalizedPath) -> Result<()> {
        let config = self.read_config(site_dir)?;
        let mut command = self.command_for(site_dir, &config.command)?;
        command.arg("generate");

        let output = command
            .output()
            .map_err(|e| Error::generation(format!("could not run '{}': {e}", config.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(5)..].join("\n");
            return Err(Error::generation(format!(
                "'{} generate' exited with {}: {tail}",
                config.command, output.status
            )));
        }

        tracing::info!(site = %site_dir, "Generated artifact");
        Ok(())
    }

    /// Start the generator's preview server for a site.
    pub fn server(&self, site_dir: &NormalizedPath) -> Result<ServerHandle> {
        let config = self.read_config(site_dir)?;
        let mut command = self.command_for(site_dir, &config.command)?;
        command
            .arg("server")
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = command
            .spawn()
            .map_err(|e| Error::generation(format!("could not run '{}': {e}", config.command)))?;

        Ok(ServerHandle {
            child: Some(child),
            address: format!("http://localhost:{}", config.port),
        })
    }

    /// Build a Command for the configured generator, working in the
    /// site directory. A command containing a path separator is
    /// resolved against the site directory so `./script.sh` works
    /// regardless of the caller's working directory.
    fn command_for(&self, site_dir: &NormalizedPath, command_line: &str) -> Result<Command> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::generation("generator command is empty"))?;

        let resolved = if program.contains('/') {
            site_dir.join(program).to_native()
        } else {
            program.into()
        };

        let mut command = Command::new(resolved);
        command.args(parts).current_dir(site_dir.to_native());
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pages_test_utils::generator::install_stub_generator;
    use tempfile::TempDir;

    #[test]
    fn test_read_config_defaults_when_absent() {
        let temp = TempDir::new().unwrap();
        let site_dir = NormalizedPath::new(temp.path());

        let config = GeneratorAdapter::new().read_config(&site_dir).unwrap();
        assert_eq!(config.command, "hexo");
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.source_dir, "source");
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn test_read_config_ignores_unknown_keys() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("_config.yml"),
            "title: My Blog\npublic_dir: out\ntheme: landscape\n",
        )
        .unwrap();
        let site_dir = NormalizedPath::new(temp.path());

        let adapter = GeneratorAdapter::new();
        let config = adapter.read_config(&site_dir).unwrap();
        assert_eq!(config.public_dir, "out");
        assert_eq!(config.command, "hexo");

        let artifact = adapter.artifact_dir(&site_dir).unwrap();
        assert!(artifact.as_str().ends_with("/out"));
    }

    #[test]
    fn test_generate_with_stub_produces_artifact() {
        let temp = TempDir::new().unwrap();
        install_stub_generator(temp.path());
        let site_dir = NormalizedPath::new(temp.path());

        GeneratorAdapter::new().generate(&site_dir).unwrap();

        assert!(temp.path().join("public/index.html").exists());
        assert!(temp.path().join("public/about.html").exists());
    }

    #[test]
    fn test_generate_failure_is_a_generation_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("_config.yml"),
            "command: /nonexistent/generator\n",
        )
        .unwrap();
        let site_dir = NormalizedPath::new(temp.path());

        let result = GeneratorAdapter::new().generate(&site_dir);
        assert!(matches!(result, Err(Error::Generation { .. })));
    }
}
