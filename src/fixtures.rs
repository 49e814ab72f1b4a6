//! Loader for the on-disk program fixtures under `tests/programs`.
//!
//! Each case is a directory holding `program.cm`, a `case.yaml` describing
//! what the pipeline should produce, and the expectation files it names.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::emit::Emit;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseClass {
    Tokens,
    Ast,
    Bytecode,
    FrontendError,
    GenerationError,
}

impl CaseClass {
    /// Stage whose rendering is compared (or whose failure is expected).
    pub fn emit(self) -> Emit {
        match self {
            CaseClass::Tokens => Emit::Tokens,
            CaseClass::Ast => Emit::Ast,
            CaseClass::Bytecode | CaseClass::FrontendError | CaseClass::GenerationError => {
                Emit::Bytecode
            }
        }
    }

    pub fn expects_error(self) -> bool {
        matches!(self, CaseClass::FrontendError | CaseClass::GenerationError)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BenchConfig {
    pub enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExpectedOutcome {
    pub stdout_file: Option<String>,
    pub stderr_contains_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaseSpec {
    pub class: CaseClass,
    #[serde(default)]
    pub bench: BenchConfig,
    pub expected: ExpectedOutcome,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub dir: PathBuf,
    pub program_path: PathBuf,
    pub spec: CaseSpec,
}

impl Case {
    pub fn read_text(&self, relative_path: &str) -> Result<String> {
        fs::read_to_string(self.dir.join(relative_path))
            .with_context(|| format!("Reading {} fixture file {}", self.name, relative_path))
    }

    pub fn source(&self) -> Result<String> {
        fs::read_to_string(&self.program_path)
            .with_context(|| format!("Reading {}", self.program_path.display()))
    }

    /// The expectation file matching the case class: stdout for listings,
    /// the error fragment for failing cases.
    pub fn expected_file(&self) -> Result<&str> {
        let expected = &self.spec.expected;
        let file = if self.spec.class.expects_error() {
            expected.stderr_contains_file.as_deref()
        } else {
            expected.stdout_file.as_deref()
        };
        file.with_context(|| {
            format!(
                "Missing expectation file for {:?} case {}",
                self.spec.class, self.name
            )
        })
    }
}

pub fn load_cases(programs_dir: &Path) -> Result<Vec<Case>> {
    let mut cases = Vec::new();

    for entry in
        fs::read_dir(programs_dir).with_context(|| format!("Reading {}", programs_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        let case_path = path.join("case.yaml");
        if !case_path.exists() {
            continue;
        }

        let program_path = path.join("program.cm");
        ensure!(
            program_path.exists(),
            "Missing program.cm for case {}",
            path.display()
        );

        let case_name = path
            .file_name()
            .and_then(|value| value.to_str())
            .map(str::to_string)
            .with_context(|| format!("Invalid case directory name {}", path.display()))?;
        let case_raw = fs::read_to_string(&case_path)
            .with_context(|| format!("Reading {}", case_path.display()))?;
        let spec: CaseSpec = serde_yaml::from_str(&case_raw)
            .with_context(|| format!("Parsing {}", case_path.display()))?;

        if spec.bench.enabled {
            ensure!(
                !spec.bench.tags.is_empty(),
                "Case {case_name} has bench enabled but no tags"
            );
        }

        cases.push(Case {
            name: case_name,
            dir: path,
            program_path,
            spec,
        });
    }

    ensure!(
        !cases.is_empty(),
        "No test cases found in {}",
        programs_dir.display()
    );
    cases.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn deserializes_case_spec() {
        let spec: CaseSpec = serde_yaml::from_str(indoc! {"
            class: frontend_error
            expected:
              stderr_contains_file: expected.err
        "})
        .expect("valid yaml");

        assert_eq!(spec.class, CaseClass::FrontendError);
        assert!(!spec.bench.enabled);
        assert_eq!(spec.expected.stderr_contains_file.as_deref(), Some("expected.err"));
        assert_eq!(spec.class.emit(), Emit::Bytecode);
    }

    #[test]
    fn rejects_unknown_class() {
        let parsed = serde_yaml::from_str::<CaseSpec>(indoc! {"
            class: runtime_success
            expected: {}
        "});
        assert!(parsed.is_err());
    }
}
