// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the fleetdeck CLI

pub mod app;
pub mod config;
pub mod container;
pub mod env;
pub mod node;
pub mod resource;
pub mod status;
pub mod view;

pub use self::app::AppCommand;
pub use self::config::ConfigCommand;
pub use self::container::ContainerCommand;
pub use self::env::EnvCommand;
pub use self::node::NodeCommand;
pub use self::resource::ResourceCommand;
pub use self::view::ViewArgs;
