#![allow(dead_code)]

use std::sync::Arc;

use cliprobe::config::{ConfigResolver, MapEnv, Properties};
use cliprobe::exec::ExecutionRequest;

/// Builder for an in-memory `ConfigResolver` to simplify test setup.
pub struct ResolverBuilder {
    properties: Properties,
    env: MapEnv,
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            properties: Properties::new(),
            env: MapEnv::new(),
        }
    }

    /// Entry in the properties store.
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Variable visible to the resolver (not to spawned children).
    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env = self.env.with(name, value);
        self
    }

    /// Host and token in the store, pointing the harness at `cli_path`.
    pub fn with_cli(self, cli_path: &str) -> Self {
        self.with_property("appknox.api.host", "https://api.test/")
            .with_property("appknox.access.token", "test-token")
            .with_property("appknox.cli.path", cli_path)
    }

    pub fn build(self) -> ConfigResolver {
        ConfigResolver::from_properties(self.properties, Arc::new(self.env))
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `sh -c <script>` request.
pub fn sh(script: &str) -> ExecutionRequest {
    ExecutionRequest::new(["sh", "-c", script]).expect("sh request is never empty")
}
