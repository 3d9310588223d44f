use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::info;

use crate::model::profile::AdminProfile;

/// Application-scoped admin profile. Writers persist and publish; the header
/// and anything else showing the profile subscribe.
pub struct ProfileStore {
    tx: watch::Sender<AdminProfile>,
    path: Option<PathBuf>,
}

impl ProfileStore {
    /// Store that lives only in memory.
    pub fn ephemeral(profile: AdminProfile) -> Self {
        let (tx, _rx) = watch::channel(profile);
        Self { tx, path: None }
    }

    /// Load the persisted profile, or defaults when nothing was saved yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let profile = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("invalid profile file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AdminProfile::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        let (tx, _rx) = watch::channel(profile);
        Ok(Self {
            tx,
            path: Some(path),
        })
    }

    pub fn read(&self) -> AdminProfile {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AdminProfile> {
        self.tx.subscribe()
    }

    /// Validate, persist, then publish. Nothing is published if persisting fails.
    pub fn write(&self, profile: AdminProfile) -> Result<AdminProfile> {
        let profile = profile.validated()?;

        if let Some(path) = &self.path {
            let raw = serde_json::to_string_pretty(&profile)?;
            fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
        }

        self.tx.send_replace(profile.clone());
        info!(name = %profile.name, "Admin profile updated");
        Ok(profile)
    }
}
