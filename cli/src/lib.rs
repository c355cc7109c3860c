// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! fleetdeck CLI library - exposes testable components

pub mod commands;
pub mod config;
pub mod render;
