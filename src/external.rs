use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// An external program that reads `{input}` and writes JSON to `{output}`.
///
/// With no configured args the program is called as `program INPUT OUTPUT`.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn expand_args(&self, input: &Path, output: &Path) -> Vec<String> {
        if self.args.is_empty() {
            return vec![
                input.to_string_lossy().into_owned(),
                output.to_string_lossy().into_owned(),
            ];
        }

        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    /// Run to completion and return what the program wrote to `output`.
    pub fn run(&self, input: &Path, output: &Path, envs: &[(&str, String)]) -> Result<String> {
        let args = self.expand_args(input, output);
        tracing::debug!("Running {} {}", self.program, args.join(" "));

        let result = Command::new(&self.program)
            .args(&args)
            .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to spawn {}", self.program))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!(
                "{} exited with status {}: {}",
                self.program,
                result.status,
                stderr.trim()
            );
        }

        std::fs::read_to_string(output)
            .with_context(|| format!("{} did not write {}", self.program, output.display()))
    }
}
