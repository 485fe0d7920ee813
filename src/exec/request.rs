// src/exec/request.rs

use std::collections::BTreeMap;

use crate::errors::{HarnessError, Result};

/// One invocation of an external program.
///
/// `argv[0]` is the program (a path, or a bare name looked up on `PATH`);
/// the rest are passed through untouched. `env` is the overlay applied on top
/// of the inherited environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    argv: Vec<String>,
    env: BTreeMap<String, String>,
}

impl ExecutionRequest {
    /// Build a request from a full argument vector.
    ///
    /// Fails when `argv` is empty or its program path is empty.
    pub fn new<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        match argv.first() {
            None => Err(HarnessError::InvalidRequest(
                "argument vector is empty".to_string(),
            )),
            Some(program) if program.is_empty() => Err(HarnessError::InvalidRequest(
                "program path is empty".to_string(),
            )),
            Some(_) => Ok(Self {
                argv,
                env: BTreeMap::new(),
            }),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.argv.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add or replace one overlay variable.
    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Everything after the program.
    pub fn arguments(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn env_overlay(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}
