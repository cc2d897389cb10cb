// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Build and run parameters for the demo suite.
//!
//! The five knobs the dispatch table substitutes into command templates:
//! LibOS backend, network driver, buffer size, injection rate, and the
//! per-job timeout. Each resolves in priority order *environment variable >
//! configuration file > built-in default*, matching the environment-driven
//! overrides the suite has always supported (`LIBOS=catnip testrig run ...`).

use crate::config::consts::{
    DEFAULT_BUFSIZE, DEFAULT_DRIVER, DEFAULT_INJECTION_RATE, DEFAULT_TIMEOUT_SECONDS,
    MAX_BUFSIZE, MAX_TIMEOUT_SECONDS, MIN_BUFSIZE, MIN_INJECTION_RATE, MIN_TIMEOUT_SECONDS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The external networking-library backend a build targets.
///
/// Selecting a LibOS only chooses which feature name gets substituted into
/// build commands; the backends themselves live in the external library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibOs {
    /// Socket-based backend
    Catnap,
    /// DPDK-based kernel-bypass backend
    Catnip,
    /// Raw-socket backend
    Catpowder,
    /// io_uring-based backend
    Catcollar,
}

impl LibOs {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibOs::Catnap => "catnap",
            LibOs::Catnip => "catnip",
            LibOs::Catpowder => "catpowder",
            LibOs::Catcollar => "catcollar",
        }
    }
}

impl fmt::Display for LibOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibOs {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catnap" => Ok(LibOs::Catnap),
            "catnip" => Ok(LibOs::Catnip),
            "catpowder" => Ok(LibOs::Catpowder),
            "catcollar" => Ok(LibOs::Catcollar),
            other => Err(ParamError::UnknownLibOs {
                value: other.to_string(),
            }),
        }
    }
}

/// Errors raised while resolving parameters from the environment.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// `LIBOS` (or the config file) names a backend that doesn't exist.
    ///
    /// Unlike the numeric knobs this is rejected rather than corrected: a
    /// typo here selects a nonexistent feature at build time.
    UnknownLibOs { value: String },
    /// A numeric environment variable failed to parse
    InvalidNumber { var: &'static str, value: String },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::UnknownLibOs { value } => {
                write!(
                    f,
                    "Unknown LibOS '{}' (expected catnap, catnip, catpowder, or catcollar)",
                    value
                )
            }
            ParamError::InvalidNumber { var, value } => {
                write!(f, "{} must be a number, got '{}'", var, value)
            }
        }
    }
}

impl std::error::Error for ParamError {}

/// Raw `params:` section of the configuration file. All fields optional.
#[derive(Debug, Deserialize)]
pub struct ParamsConfig {
    pub libos: Option<LibOs>,
    pub driver: Option<String>,
    pub bufsize: Option<u64>,
    pub injection_rate: Option<u64>,
    pub timeout: Option<u64>,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            libos: None,
            driver: None,
            bufsize: None,
            injection_rate: None,
            timeout: None,
        }
    }
}

/// Fully resolved parameters, ready for command-template substitution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Params {
    pub libos: LibOs,
    pub driver: String,
    /// Buffer size in bytes, clamped to [MIN_BUFSIZE, MAX_BUFSIZE]
    pub bufsize: u64,
    /// Inter-packet gap in micro-seconds, at least MIN_INJECTION_RATE
    pub injection_rate: u64,
    /// Default per-job timeout in seconds, clamped to sane bounds
    pub timeout_seconds: u64,
}

impl Params {
    /// Resolve parameters against the process environment.
    pub fn resolve(cfg: &ParamsConfig) -> Result<Self, ParamError> {
        Self::resolve_with(cfg, |var| std::env::var(var).ok())
    }

    /// Resolve parameters with an injectable environment lookup.
    ///
    /// Tests pass a closure over a plain map; production code goes through
    /// [`Params::resolve`].
    pub fn resolve_with<F>(cfg: &ParamsConfig, lookup: F) -> Result<Self, ParamError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let libos = match lookup("LIBOS") {
            Some(value) => value.parse()?,
            None => cfg.libos.unwrap_or(LibOs::Catnap),
        };

        let driver = lookup("DRIVER")
            .or_else(|| cfg.driver.clone())
            .unwrap_or_else(|| DEFAULT_DRIVER.to_string());

        let bufsize = Self::numeric(&lookup, "BUFSIZE", cfg.bufsize, DEFAULT_BUFSIZE)?
            .clamp(MIN_BUFSIZE, MAX_BUFSIZE);

        let injection_rate = Self::numeric(
            &lookup,
            "INJECTION_RATE",
            cfg.injection_rate,
            DEFAULT_INJECTION_RATE,
        )?
        .max(MIN_INJECTION_RATE);

        let timeout_seconds = Self::numeric(&lookup, "TIMEOUT", cfg.timeout, DEFAULT_TIMEOUT_SECONDS)?
            .clamp(MIN_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS);

        Ok(Self {
            libos,
            driver,
            bufsize,
            injection_rate,
            timeout_seconds,
        })
    }

    fn numeric<F>(
        lookup: &F,
        var: &'static str,
        configured: Option<u64>,
        default: u64,
    ) -> Result<u64, ParamError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(value) => value.trim().parse().map_err(|_| ParamError::InvalidNumber {
                var,
                value: value.clone(),
            }),
            None => Ok(configured.unwrap_or(default)),
        }
    }

    /// The substitution variables this parameter set contributes to command
    /// templates (`${libos}`, `${driver}`, `${bufsize}`, `${injection_rate}`,
    /// `${timeout}`).
    pub fn substitutions(&self) -> HashMap<String, String> {
        HashMap::from([
            ("libos".to_string(), self.libos.to_string()),
            ("driver".to_string(), self.driver.clone()),
            ("bufsize".to_string(), self.bufsize.to_string()),
            (
                "injection_rate".to_string(),
                self.injection_rate.to_string(),
            ),
            ("timeout".to_string(), self.timeout_seconds.to_string()),
        ])
    }
}
