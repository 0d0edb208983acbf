// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory clean` - Top-level alias for `worktree clean`

use super::worktree;
use anyhow::Result;

pub async fn clean(args: &worktree::CleanArgs) -> Result<()> {
    worktree::clean(args).await
}
