use std::{
    collections::HashMap,
    path::PathBuf,
    process::{Command as Process, Stdio},
    sync::LazyLock,
};

use anyhow::Context;
use regex::Regex;
use requirement_walker::{Config, RequirementFile, WalkOptions};
use tracing::instrument;

use super::terminal::Tone;

/// Pulls the `user@host` part out of an SSH URL.
static SSH_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ssh://(?P<domain>[^/]+)/").expect("pattern is valid"));

/// The leading SSH part of a URL, swapped for HTTPS.
static SSH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ssh://git@").expect("pattern is valid"));

#[derive(Debug, clap::Parser)]
#[command(about = "Swap SSH git URLs for HTTPS where the SSH host is not reachable")]
pub struct Command {
    /// The requirements file to read
    file: PathBuf,

    /// Where to write the rewritten, flattened file
    dest: PathBuf,
}

impl Command {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        self.run_with(config, &mut SystemSsh::default())
    }

    fn run_with(self, config: &Config, ssh: &mut impl SshAccess) -> anyhow::Result<()> {
        let mut file = RequirementFile::new(&self.file);
        let rewritten = rewrite(&mut file, config.walk_options(), ssh)
            .with_context(|| format!("failed to read {}", self.file.display()))?;

        let written = file
            .to_single_file(&self.dest, config.export_options())
            .with_context(|| format!("failed to write {}", self.dest.display()))?;

        println!(
            "{}",
            Tone::Done.paint(&format!(
                "Rewrote {rewritten} requirements, wrote {written} lines to {}",
                self.dest.display()
            ))
        );
        Ok(())
    }
}

/// Checks whether this machine can authenticate to an SSH host.
pub trait SshAccess {
    /// Whether `domain` (e.g. `git@github.com`) accepts our SSH credentials.
    fn has_access(&mut self, domain: &str) -> bool;
}

/// Checks SSH hosts with the system `ssh` client, remembering each answer.
#[derive(Debug, Default)]
pub struct SystemSsh {
    seen: HashMap<String, bool>,
}

impl SshAccess for SystemSsh {
    fn has_access(&mut self, domain: &str) -> bool {
        if let Some(&access) = self.seen.get(domain) {
            return access;
        }

        let status = Process::new("ssh")
            .args(["-T", "-q", "-o", "BatchMode=yes", domain])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        // ssh exits with 255 when it could not connect or authenticate
        let access = match status {
            Ok(status) => status.code() != Some(255),
            Err(e) => {
                tracing::warn!("could not run ssh: {e}");
                false
            }
        };

        tracing::debug!("ssh access to {domain}: {access}");
        self.seen.insert(domain.to_string(), access);
        access
    }
}

/// Rewrites every `ssh://git@` requirement URL in the tree to `https://` when
/// the SSH host is not reachable. Returns the number of URLs rewritten.
fn rewrite(
    file: &mut RequirementFile,
    options: WalkOptions,
    ssh: &mut impl SshAccess,
) -> Result<usize, requirement_walker::Error> {
    let mut rewritten = 0;

    for entry in file.iter_recursive_mut(options)? {
        let Some(requirement) = entry.requirement_mut() else {
            continue;
        };
        let Some(url) = requirement.url() else {
            continue;
        };
        let Some(domain) = SSH_DOMAIN.captures(url).and_then(|c| c.name("domain")) else {
            continue;
        };
        if ssh.has_access(domain.as_str()) {
            continue;
        }

        let new_url = SSH_PREFIX.replace(url, "https://").into_owned();
        tracing::info!(
            "No access to domain {}, swapping {url} for {new_url}",
            domain.as_str()
        );
        requirement.set_url(new_url);
        rewritten += 1;
    }

    Ok(rewritten)
}
