//! JSON file implementation of [`LeaveStore`].
//!
//! One document holds every tenant's records:
//!
//! ```json
//! { "tenants": { "acme": { "leaves": [...], "holidays": [...] } } }
//! ```
//!
//! Writes go to a temp file that is renamed over the original. A mutex keeps
//! read-modify-write cycles within one process from interleaving.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::record::{HolidayEvent, LeaveEvent, LeaveId, Tenant};
use crate::store::{LeaveStore, MarkedSet, ObservedLeave, Records, StoreError, StoreResult};
use crate::sync::RecordFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    #[default]
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLeave {
    #[serde(flatten)]
    leave: LeaveEvent,
    #[serde(default)]
    status: LeaveStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TenantData {
    #[serde(default)]
    leaves: Vec<StoredLeave>,
    #[serde(default)]
    holidays: Vec<HolidayEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    tenants: BTreeMap<String, TenantData>,
}

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as an empty store.
    async fn load(&self) -> StoreResult<StoreData> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(StoreData::default());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content).map_err(|e| {
            StoreError::Serialization(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Write to a uniquely named temp file in the same directory, then rename
    /// it over the store. Another process saving at the same time gets its own
    /// temp file.
    async fn save(&self, data: &StoreData) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
            temp.write_all(content.as_bytes())?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;

        Ok(())
    }

    /// Add or replace a tenant's records. Used to seed the store.
    pub async fn put_records(
        &self,
        tenant: &Tenant,
        leaves: Vec<(LeaveEvent, LeaveStatus)>,
        holidays: Vec<HolidayEvent>,
    ) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut data = self.load().await?;

        let tenant_data = data.tenants.entry(tenant.id.clone()).or_default();
        tenant_data.leaves = leaves
            .into_iter()
            .map(|(leave, status)| StoredLeave { leave, status })
            .collect();
        tenant_data.holidays = holidays;

        self.save(&data).await
    }
}

#[async_trait]
impl LeaveStore for JsonFileStore {
    async fn fetch(&self, tenant: &Tenant, filter: &RecordFilter) -> StoreResult<Records> {
        let data = self.load().await?;

        let Some(tenant_data) = data.tenants.get(&tenant.id) else {
            debug!(tenant = %tenant.id, "no records stored for tenant");
            return Ok(Records::default());
        };

        let leaves = if filter.include_leaves {
            tenant_data
                .leaves
                .iter()
                .filter(|stored| stored.status == LeaveStatus::Approved)
                .map(|stored| &stored.leave)
                .filter(|leave| filter.matches_leave(leave))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let holidays = if filter.include_holidays {
            tenant_data
                .holidays
                .iter()
                .filter(|holiday| filter.matches_holiday(holiday))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        Ok(Records { leaves, holidays })
    }

    async fn mark_sent(
        &self,
        tenant: &Tenant,
        leaves: &[ObservedLeave],
        at: DateTime<Utc>,
    ) -> StoreResult<MarkedSet> {
        let _guard = self.lock.lock().await;
        let mut data = self.load().await?;
        let mut result = MarkedSet::default();

        let observed: HashMap<&LeaveId, Option<DateTime<Utc>>> =
            leaves.iter().map(|l| (&l.id, l.sent_at)).collect();
        let mut seen = HashSet::new();

        if let Some(tenant_data) = data.tenants.get_mut(&tenant.id) {
            for stored in &mut tenant_data.leaves {
                let leave = &mut stored.leave;
                let Some(expected) = observed.get(&leave.id) else {
                    continue;
                };
                if !seen.insert(leave.id.clone()) {
                    continue;
                }
                if leave.sent_at == *expected {
                    leave.sent_at = Some(at);
                    result.marked.push(leave.id.clone());
                } else {
                    result.already_sent.push(leave.id.clone());
                }
            }
        }

        result.missing = leaves
            .iter()
            .filter(|l| !seen.contains(&l.id))
            .map(|l| l.id.clone())
            .collect();

        if !result.marked.is_empty() {
            self.save(&data).await?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DurationType;
    use chrono::{NaiveDate, TimeZone};

    fn tenant() -> Tenant {
        Tenant {
            id: "acme".to_string(),
            name: "Acme".to_string(),
        }
    }

    fn leave(id: &str, location: Option<&str>) -> LeaveEvent {
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        LeaveEvent {
            id: LeaveId::new(id),
            ics_uid: format!("uid-{}", id),
            start_date: day,
            end_date: day,
            duration_type: DurationType::FullDay,
            total_hours: 8.0,
            remark: None,
            member_name: "Carol".to_string(),
            leave_type: "Annual Leave".to_string(),
            location: location.map(String::from),
            sent_at: None,
        }
    }

    fn holiday(id: &str) -> HolidayEvent {
        HolidayEvent {
            id: id.to_string(),
            name: "Holiday".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
            end_date: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        let records = store
            .fetch(&tenant(), &RecordFilter::default())
            .await
            .unwrap();
        assert_eq!(records, Records::default());
    }

    #[tokio::test]
    async fn test_fetch_returns_only_approved_leave() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        store
            .put_records(
                &tenant(),
                vec![
                    (leave("ok", None), LeaveStatus::Approved),
                    (leave("wait", None), LeaveStatus::Pending),
                    (leave("no", None), LeaveStatus::Rejected),
                ],
                vec![holiday("h1")],
            )
            .await
            .unwrap();

        let records = store
            .fetch(&tenant(), &RecordFilter::default())
            .await
            .unwrap();
        let ids: Vec<_> = records.leaves.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert_eq!(records.holidays.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_respects_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        store
            .put_records(
                &tenant(),
                vec![
                    (leave("sg", Some("SG")), LeaveStatus::Approved),
                    (leave("kl", Some("KL")), LeaveStatus::Approved),
                ],
                vec![holiday("h1")],
            )
            .await
            .unwrap();

        let filter = RecordFilter {
            include_holidays: false,
            ..RecordFilter::default()
        }
        .with_location(Some("KL"));
        let records = store.fetch(&tenant(), &filter).await.unwrap();

        assert_eq!(records.leaves.len(), 1);
        assert_eq!(records.leaves[0].id.as_str(), "kl");
        assert!(records.holidays.is_empty());
    }

    fn observed(id: &str, sent_at: Option<DateTime<Utc>>) -> ObservedLeave {
        ObservedLeave {
            id: LeaveId::new(id),
            sent_at,
        }
    }

    #[tokio::test]
    async fn test_mark_sent_compares_observed_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        store
            .put_records(
                &tenant(),
                vec![
                    (leave("a", None), LeaveStatus::Approved),
                    (leave("b", None), LeaveStatus::Approved),
                ],
                vec![],
            )
            .await
            .unwrap();

        let first = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

        let marked = store
            .mark_sent(&tenant(), &[observed("a", None)], first)
            .await
            .unwrap();
        assert_eq!(marked.marked, vec![LeaveId::new("a")]);

        // "a" was read before the first stamp, so the second export lost the race.
        let marked = store
            .mark_sent(
                &tenant(),
                &[observed("a", None), observed("b", None), observed("gone", None)],
                second,
            )
            .await
            .unwrap();
        assert_eq!(marked.marked, vec![LeaveId::new("b")]);
        assert_eq!(marked.already_sent, vec![LeaveId::new("a")]);
        assert_eq!(marked.missing, vec![LeaveId::new("gone")]);

        let records = store
            .fetch(&tenant(), &RecordFilter::default())
            .await
            .unwrap();
        assert_eq!(records.leaves[0].sent_at, Some(first));
        assert_eq!(records.leaves[1].sent_at, Some(second));
    }

    #[tokio::test]
    async fn test_mark_sent_refreshes_previously_sent_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        let earlier = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();

        let mut sent = leave("a", None);
        sent.sent_at = Some(earlier);
        store
            .put_records(&tenant(), vec![(sent, LeaveStatus::Approved)], vec![])
            .await
            .unwrap();

        let marked = store
            .mark_sent(&tenant(), &[observed("a", Some(earlier))], now)
            .await
            .unwrap();
        assert_eq!(marked.marked, vec![LeaveId::new("a")]);
        assert!(marked.already_sent.is_empty());

        let records = store
            .fetch(&tenant(), &RecordFilter::default())
            .await
            .unwrap();
        assert_eq!(records.leaves[0].sent_at, Some(now));
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/store.json"));
        store
            .put_records(&tenant(), vec![(leave("a", None), LeaveStatus::Approved)], vec![])
            .await
            .unwrap();
        store
            .put_records(&tenant(), vec![(leave("b", None), LeaveStatus::Approved)], vec![])
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["store.json".to_string()]);

        let records = store
            .fetch(&tenant(), &RecordFilter::default())
            .await
            .unwrap();
        assert_eq!(records.leaves[0].id, LeaveId::new("b"));
    }

    #[tokio::test]
    async fn test_separate_handles_on_one_file_both_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let cli = JsonFileStore::new(&path);
        let server = JsonFileStore::new(&path);
        let globex = Tenant {
            id: "globex".to_string(),
            name: "Globex".to_string(),
        };

        cli.put_records(&tenant(), vec![(leave("a", None), LeaveStatus::Approved)], vec![])
            .await
            .unwrap();
        server
            .put_records(&globex, vec![(leave("g", None), LeaveStatus::Approved)], vec![])
            .await
            .unwrap();

        let acme = cli.fetch(&tenant(), &RecordFilter::default()).await.unwrap();
        let other = cli.fetch(&globex, &RecordFilter::default()).await.unwrap();
        assert_eq!(acme.leaves.len(), 1);
        assert_eq!(other.leaves.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        let result = store.fetch(&tenant(), &RecordFilter::default()).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
