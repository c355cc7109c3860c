// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! fleetdeck dashboard
//!
//! - [`router`]: which page renders a location, and with which parameters
//! - [`proxy`]: where backend traffic goes during local development

pub mod proxy;
pub mod router;

pub use proxy::{dev_proxy_rules, rule_for, ProxyRule, DEFAULT_BACKEND_URL};
pub use router::{Page, Params, ResolvedView, Route, RouterError, ViewRouter};
