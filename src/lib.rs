// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Modelwire remote model access library.
//!
//! The server side hosts a reflective, metamodel-backed object store and exposes it through
//! the [`service::ModelAccessService`] handlers, bound to MCP tools by [`mcp`]. The client
//! side ([`client`]) drives any such host as a typed model with live proxy lists.

pub mod catalog;
pub mod client;
pub mod codec;
pub mod error;
pub mod mcp;
pub mod model;
pub mod protocol;
pub mod service;
pub mod session;
pub mod store;
