use anyhow::Result;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    core::{
        backup::{self, ParsedBackup},
        settings::{Settings, SettingsPatch},
        tally::TallyStore,
    },
    storage::blob_store::{BlobStore, SETTINGS_SLOT, TALLY_SLOT},
};

/// The single shared application state. Every command and session goes
/// through here, so a mutation always pairs with a write to the blob store.
pub struct AppState<S: BlobStore> {
    blobs: S,
    store: TallyStore,
    settings: Settings,
    today: NaiveDate,
}

impl<S: BlobStore> AppState<S> {
    /// Loads persisted state. Missing slots start empty; corrupt slots are
    /// recovered with a warning instead of failing startup.
    pub async fn load(blobs: S, today: NaiveDate) -> Result<Self> {
        let store = match blobs.read(TALLY_SLOT).await? {
            None => TallyStore::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Persisted tally history is corrupt, starting empty: {e}");
                    TallyStore::new()
                }
            },
        };
        let settings = Settings::load(blobs.read(SETTINGS_SLOT).await?.as_deref());

        Ok(Self {
            blobs,
            store,
            settings,
            today,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn store(&self) -> &TallyStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Count recorded for the active day.
    pub fn todays_count(&self) -> u64 {
        self.store.get(self.today)
    }

    /// Applies a tap (positive) or undo (negative) to the active day and
    /// persists the result.
    pub async fn record(&mut self, delta: i64) -> Result<u64> {
        let next = self.store.adjust(self.today, delta);
        self.persist_tally().await?;
        Ok(next)
    }

    /// Swaps the active day. Returns true when `today` differs from the day
    /// the state was tracking, i.e. the date rolled over. Counts already
    /// recorded for the previous day stay exactly as written.
    pub fn roll_to(&mut self, today: NaiveDate) -> bool {
        if today == self.today {
            return false;
        }
        info!("Active day moved from {} to {today}", self.today);
        self.today = today;
        true
    }

    /// Overlays a settings edit and persists the result.
    pub async fn update_settings(&mut self, patch: SettingsPatch) -> Result<&Settings> {
        self.settings = self.settings.update(patch);
        self.persist_settings().await?;
        Ok(&self.settings)
    }

    /// Serialized backup of the current state.
    pub fn export(&self) -> String {
        backup::export_document(&self.store, &self.settings)
    }

    /// Replaces state with a parsed backup. Callers must have obtained the
    /// destructive-overwrite confirmation before invoking this.
    pub async fn apply_import(&mut self, parsed: ParsedBackup) -> Result<()> {
        self.store.replace_all(parsed.history);
        self.persist_tally().await?;
        if let Some(settings) = parsed.settings {
            self.settings = settings;
            self.persist_settings().await?;
        }
        Ok(())
    }

    /// Wipes the tally history along with its persisted slot.
    pub async fn clear(&mut self) -> Result<()> {
        self.store.replace_all(Default::default());
        self.blobs.remove(TALLY_SLOT).await
    }

    async fn persist_tally(&self) -> Result<()> {
        // An empty store is never written: before the persisted value is
        // loaded it would be clobbered with an empty object.
        if self.store.is_empty() {
            return Ok(());
        }
        let serialized = serde_json::to_string(&self.store)?;
        self.blobs.write(TALLY_SLOT, &serialized).await
    }

    async fn persist_settings(&self) -> Result<()> {
        let serialized = serde_json::to_string(&self.settings)?;
        self.blobs.write(SETTINGS_SLOT, &serialized).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use anyhow::Result;
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    use crate::{
        core::{
            backup::ParsedBackup,
            settings::{Settings, SettingsPatch},
        },
        storage::blob_store::{MockBlobStore, SETTINGS_SLOT, TALLY_SLOT},
    };

    use super::AppState;

    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    fn empty_blobs() -> MockBlobStore {
        let mut blobs = MockBlobStore::new();
        blobs.expect_read().returning(|_| Ok(None));
        blobs
    }

    #[tokio::test]
    async fn loads_empty_state_from_missing_slots() -> Result<()> {
        let state = AppState::load(empty_blobs(), TODAY).await?;

        assert!(state.store().is_empty());
        assert_eq!(state.settings(), &Settings::default());
        assert_eq!(state.todays_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn recovers_from_corrupt_slots() -> Result<()> {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_read()
            .returning(|_| Ok(Some("definitely not json".to_string())));

        let state = AppState::load(blobs, TODAY).await?;

        assert!(state.store().is_empty());
        assert_eq!(state.settings(), &Settings::default());
        Ok(())
    }

    #[tokio::test]
    async fn recording_persists_the_whole_store() -> Result<()> {
        let mut blobs = empty_blobs();
        blobs
            .expect_write()
            .with(eq(TALLY_SLOT), eq(r#"{"2024-03-01":2}"#))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut state = AppState::load(blobs, TODAY).await?;
        assert_eq!(state.record(2).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn importing_an_empty_history_skips_the_tally_write() -> Result<()> {
        let mut blobs = empty_blobs();
        blobs.expect_write().never();

        let mut state = AppState::load(blobs, TODAY).await?;
        state
            .apply_import(ParsedBackup {
                history: BTreeMap::new(),
                settings: None,
            })
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn importing_replaces_history_and_settings() -> Result<()> {
        let mut blobs = empty_blobs();
        blobs
            .expect_write()
            .with(eq(TALLY_SLOT), eq(r#"{"2024-01-01":3}"#))
            .times(1)
            .returning(|_, _| Ok(()));
        blobs
            .expect_write()
            .with(eq(SETTINGS_SLOT), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut state = AppState::load(blobs, TODAY).await?;

        let imported_settings = Settings {
            conversion_label: "Reps".to_string(),
            ..Settings::default()
        };
        state
            .apply_import(ParsedBackup {
                history: BTreeMap::from([(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3)]),
                settings: Some(imported_settings.clone()),
            })
            .await?;

        assert_eq!(state.todays_count(), 0);
        assert_eq!(state.settings(), &imported_settings);
        Ok(())
    }

    #[tokio::test]
    async fn updating_settings_always_writes_their_slot() -> Result<()> {
        let mut blobs = empty_blobs();
        blobs
            .expect_write()
            .withf(|slot, contents| slot == SETTINGS_SLOT && contents.contains("Reps"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut state = AppState::load(blobs, TODAY).await?;
        let updated = state
            .update_settings(SettingsPatch {
                conversion_label: Some("Reps".to_string()),
                ..Default::default()
            })
            .await?;
        assert_eq!(updated.conversion_label, "Reps");
        Ok(())
    }

    #[tokio::test]
    async fn clearing_removes_the_persisted_slot() -> Result<()> {
        let mut blobs = empty_blobs();
        blobs
            .expect_write()
            .returning(|_, _| Ok(()));
        blobs
            .expect_remove()
            .with(eq(TALLY_SLOT))
            .times(1)
            .returning(|_| Ok(()));

        let mut state = AppState::load(blobs, TODAY).await?;
        state.record(5).await?;
        state.clear().await?;

        assert!(state.store().is_empty());
        assert_eq!(state.todays_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn rollover_switches_the_active_day() -> Result<()> {
        let mut blobs = empty_blobs();
        blobs.expect_write().returning(|_, _| Ok(()));

        let mut state = AppState::load(blobs, TODAY).await?;
        state.record(4).await?;

        assert!(!state.roll_to(TODAY));

        let tomorrow = TODAY.succ_opt().unwrap();
        assert!(state.roll_to(tomorrow));
        assert_eq!(state.todays_count(), 0);
        assert_eq!(state.store().get(TODAY), 4);
        Ok(())
    }
}
