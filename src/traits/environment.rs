// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Read access to environment variables for environment-sourced parameters.
pub trait EnvironmentSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the variables of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl EnvironmentSource for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
