//! Bounded alias registry
//!
//! Aliases are persisted as one pretty-printed JSON array, overwritten
//! wholesale on every mutation. The set is capped at 20 entries and seeded
//! with three launcher built-ins on first use. Every mutation re-reads the
//! persisted document first; nothing is cached across calls, so concurrent
//! writers from separate processes are last-writer-wins.

use crate::error::{ClinicError, Result};
use crate::types::{Alias, AliasUpdate, LaunchTarget};
use chrono::Utc;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// Upper bound on persisted aliases.
pub const MAX_ALIASES: usize = 20;

/// Filename of the alias document inside the support directory.
pub const ALIASES_FILE: &str = "aliases.json";

/// Seed set written on first use and used as the fallback when the
/// document cannot be read. Order is fixed.
pub static DEFAULT_ALIASES: Lazy<Vec<Alias>> = Lazy::new(|| {
    vec![
        Alias {
            id: "file-search".to_string(),
            title: "File Search".to_string(),
            target: LaunchTarget::new("builtin", "file-search", "search-files"),
            suggest_hotkey: None,
        },
        Alias {
            id: "clipboard-history".to_string(),
            title: "Clipboard History".to_string(),
            target: LaunchTarget::new("builtin", "clipboard-history", "clipboard-history"),
            suggest_hotkey: None,
        },
        Alias {
            id: "window-management".to_string(),
            title: "Window Management".to_string(),
            target: LaunchTarget::new("builtin", "window-management", "tile-window"),
            suggest_hotkey: None,
        },
    ]
});

/// CRUD over the persisted alias set.
pub struct AliasRegistry {
    dir: PathBuf,
}

impl AliasRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(ALIASES_FILE)
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Return all persisted aliases.
    ///
    /// Seeds the document with [`DEFAULT_ALIASES`] when it does not exist.
    /// A read or parse failure of an existing document falls back to the
    /// defaults instead of erroring; the alias list must stay available
    /// even over corrupt local state.
    pub async fn list(&self) -> Result<Vec<Alias>> {
        self.ensure_dir().await?;
        let path = self.path();

        match fs::read_to_string(&path).await {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(aliases) => Ok(aliases),
                Err(e) => {
                    warn!(error = %e, "alias document corrupt, falling back to defaults");
                    Ok(DEFAULT_ALIASES.clone())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("alias document missing, seeding defaults");
                self.save(DEFAULT_ALIASES.as_slice()).await?;
                Ok(DEFAULT_ALIASES.clone())
            }
            Err(e) => {
                warn!(error = %e, "alias document unreadable, falling back to defaults");
                Ok(DEFAULT_ALIASES.clone())
            }
        }
    }

    /// Look up a single alias by id.
    pub async fn find(&self, id: &str) -> Result<Option<Alias>> {
        Ok(self.list().await?.into_iter().find(|a| a.id == id))
    }

    /// Add a new alias.
    ///
    /// Fails when the set is full or when either the id or the target
    /// triple is already taken. An empty id is synthesized from the target
    /// fields plus a timestamp.
    pub async fn add(&self, mut alias: Alias) -> Result<()> {
        let mut aliases = self.list().await?;

        if aliases.len() >= MAX_ALIASES {
            return Err(ClinicError::CapacityExceeded(MAX_ALIASES));
        }

        if let Some(dup) = aliases.iter().find(|a| {
            (!alias.id.is_empty() && a.id == alias.id) || a.target.same_command(&alias.target)
        }) {
            return Err(ClinicError::DuplicateAlias(dup.title.clone()));
        }

        if alias.id.is_empty() {
            alias.id = format!(
                "{}_{}_{}",
                alias.target.extension,
                alias.target.command,
                Utc::now().timestamp_millis()
            );
        }

        debug!(id = %alias.id, "adding alias");
        aliases.push(alias);
        self.save(&aliases).await
    }

    /// Merge a partial update into an existing alias.
    ///
    /// Omitted fields are preserved; an attempt to change `id` is rejected.
    pub async fn update(&self, id: &str, updates: AliasUpdate) -> Result<()> {
        let mut aliases = self.list().await?;

        let Some(existing) = aliases.iter_mut().find(|a| a.id == id) else {
            return Err(ClinicError::AliasNotFound(id.to_string()));
        };

        if let Some(new_id) = &updates.id {
            if new_id != id {
                return Err(ClinicError::ImmutableField("id"));
            }
        }

        if let Some(title) = updates.title {
            existing.title = title;
        }
        if let Some(target) = updates.target {
            existing.target = target;
        }
        if let Some(hotkey) = updates.suggest_hotkey {
            existing.suggest_hotkey = Some(hotkey);
        }

        self.save(&aliases).await
    }

    /// Remove an alias by id. Persisting an empty set is valid.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let mut aliases = self.list().await?;

        if !aliases.iter().any(|a| a.id == id) {
            return Err(ClinicError::AliasNotFound(id.to_string()));
        }

        aliases.retain(|a| a.id != id);
        debug!(id, "removed alias");
        self.save(&aliases).await
    }

    /// Unconditionally overwrite the alias document.
    ///
    /// Used internally by every mutation and exposed as the bulk-replace
    /// primitive. Write failures are surfaced.
    pub async fn save(&self, aliases: &[Alias]) -> Result<()> {
        self.ensure_dir().await?;
        let data = serde_json::to_string_pretty(aliases)?;
        fs::write(self.path(), data).await?;
        Ok(())
    }
}
