//! Collaborators backed by external programs.
//!
//! Both read their input as JSON on stdin. A relocator gets the input and
//! output archive paths as its last two arguments; a dependency resolver
//! prints a JSON array of resolved artifacts on stdout.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::artifact::Relocation;
use crate::relocate::Relocator;
use crate::transitive::{parse_resolved, DependencyGraph, DependencyRequest, ResolvedArtifact};

/// Program plus leading arguments, as written in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Runs the command with `stdin` piped in and returns its stdout.
    fn run(&self, mut cmd: Command, stdin: &[u8]) -> Result<Vec<u8>> {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", self.program))?;
        if let Some(mut pipe) = child.stdin.take() {
            // A program that ignores its input may exit before reading it.
            if let Err(e) = pipe.write_all(stdin) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e).with_context(|| format!("failed to write to {}", self.program));
                }
            }
        }
        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for {}", self.program))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} failed ({}):\n{}", self.program, output.status, stderr.trim_end());
        }
        Ok(output.stdout)
    }

    fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            bail!("command program is empty");
        }
        Ok(())
    }
}

/// Runs `program args... <input> <output>` with the rules as JSON on stdin.
#[derive(Debug, Clone)]
pub struct CommandRelocator {
    spec: CommandSpec,
}

impl CommandRelocator {
    pub fn new(spec: CommandSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self { spec })
    }
}

impl Relocator for CommandRelocator {
    fn relocate(&self, input: &Path, output: &Path, rules: &[Relocation]) -> Result<()> {
        let rules = serde_json::to_vec(rules)?;
        let mut cmd = self.spec.command();
        cmd.arg(input).arg(output);
        tracing::debug!("running relocator {} on {}", self.spec.program, input.display());
        self.spec.run(cmd, &rules)?;
        Ok(())
    }
}

/// Runs `program args...` with the request as JSON on stdin and reads the
/// closure from stdout.
#[derive(Debug, Clone)]
pub struct CommandGraph {
    spec: CommandSpec,
}

impl CommandGraph {
    pub fn new(spec: CommandSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self { spec })
    }
}

impl DependencyGraph for CommandGraph {
    fn find_transitive(&self, request: &DependencyRequest) -> Result<Vec<ResolvedArtifact>> {
        let body = serde_json::to_vec(request)?;
        tracing::debug!(
            "running dependency resolver {} for {}:{}:{}",
            self.spec.program,
            request.group_id,
            request.artifact_id,
            request.version
        );
        let stdout = self.spec.run(self.spec.command(), &body)?;
        parse_resolved(&stdout)
            .with_context(|| format!("{} printed an invalid dependency list", self.spec.program))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").arg("-c").arg(script).arg("sh")
    }

    #[test]
    fn empty_program_rejected() {
        assert!(CommandRelocator::new(CommandSpec::new("  ")).is_err());
        assert!(CommandGraph::new(CommandSpec::new("")).is_err());
    }

    #[test]
    fn relocator_gets_paths_and_rules() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jar");
        let output = dir.path().join("out.jar");
        fs::write(&input, b"x").unwrap();
        // Writes the rules JSON to the output path.
        let r = CommandRelocator::new(sh(r#"test -f "$1" && cat > "$2""#)).unwrap();
        r.relocate(&input, &output, &[Relocation::new("a{}b", "c{}d")])
            .unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains(r#""pattern":"a.b""#));
        assert!(written.contains(r#""relocatedPattern":"c.d""#));
    }

    #[test]
    fn failing_command_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let r =
            CommandRelocator::new(sh("cat > /dev/null; echo 'bad archive' >&2; exit 3")).unwrap();
        let err = r
            .relocate(&dir.path().join("a"), &dir.path().join("b"), &[])
            .unwrap_err();
        assert!(format!("{:#}", err).contains("bad archive"));
    }

    #[test]
    fn graph_reads_json_from_stdout() {
        let g = CommandGraph::new(sh(
            r#"cat > /dev/null; echo '[{"groupId":"org.slf4j","artifactId":"slf4j-api","baseVersion":"2.0.9","version":"2.0.9"}]'"#,
        ))
        .unwrap();
        let request = DependencyRequest {
            group_id: "org.example".to_string(),
            artifact_id: "app".to_string(),
            version: "1.0".to_string(),
            classifier: None,
            repositories: vec!["https://repo1.maven.org/maven2/".to_string()],
        };
        let deps = g.find_transitive(&request).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].artifact_id, "slf4j-api");
        assert!(deps[0].repository.is_none());
    }

    #[test]
    fn graph_rejects_garbage() {
        let g = CommandGraph::new(sh("cat > /dev/null; echo not json")).unwrap();
        let request = DependencyRequest {
            group_id: "g".to_string(),
            artifact_id: "a".to_string(),
            version: "1".to_string(),
            classifier: None,
            repositories: Vec::new(),
        };
        assert!(g.find_transitive(&request).is_err());
    }
}
