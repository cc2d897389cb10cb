// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod dispatch;
pub mod error;
pub mod factory;
pub mod remote;
mod runner;
pub mod shell;

pub use error::DispatchError;
pub use factory::JobFactory;
pub use remote::RemoteJob;
pub use shell::ShellJob;
