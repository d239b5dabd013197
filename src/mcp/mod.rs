// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model Context Protocol (MCP) binding of the remote model access protocol.
//!
//! Every protocol operation is one MCP tool; errors carry structured metadata (see
//! [`error`]) so clients can branch on reason codes.

mod error;
mod server;

pub use server::{ModelwireMcp, SHUTDOWN_GRACE};
