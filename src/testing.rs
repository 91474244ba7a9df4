//! In-memory collaborators for use case and router tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

use async_trait::async_trait;
use time::{macros::datetime, Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::{jwt::TokenService, password::HashService, repo::UserRepo},
    clock::Clock,
    db::{RepoError, RepoResult},
    items::repo::ItemRepo,
    model::{City, Item, PickupPoint, Reception, ReceptionStatus, Role, User},
    pvz::{
        repo::PickupPointRepo,
        repo_types::{ListFilter, PvzListRow},
    },
    receptions::repo::ReceptionRepo,
};

#[derive(Default)]
struct Tables {
    pvz: Vec<PickupPoint>,
    receptions: Vec<Reception>,
    items: Vec<Item>,
    users: Vec<User>,
    last_filter: Option<ListFilter>,
}

/// Implements every repository over plain vectors. Uniqueness rules match
/// the database schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    hide_open: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every repository call fails with a database error while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `find_open` reports nothing, as a concurrent request would observe.
    pub fn hide_open_receptions(&self, hide: bool) {
        self.hide_open.store(hide, Ordering::SeqCst);
    }

    fn tables(&self) -> RepoResult<MutexGuard<'_, Tables>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.tables.lock().expect("store lock"))
    }

    fn snapshot(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("store lock")
    }

    pub fn add_pickup_point(&self, city: City, registration_date: OffsetDateTime) -> PickupPoint {
        let pvz = PickupPoint {
            id: Uuid::new_v4(),
            registration_date,
            city,
        };
        self.snapshot().pvz.push(pvz.clone());
        pvz
    }

    pub fn put_reception(&self, reception: Reception) {
        self.snapshot().receptions.push(reception);
    }

    pub fn put_item(&self, item: Item) {
        self.snapshot().items.push(item);
    }

    pub fn pickup_points(&self) -> Vec<PickupPoint> {
        self.snapshot().pvz.clone()
    }

    pub fn receptions(&self) -> Vec<Reception> {
        self.snapshot().receptions.clone()
    }

    pub fn items(&self) -> Vec<Item> {
        self.snapshot().items.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.snapshot().users.clone()
    }

    pub fn last_filter(&self) -> Option<ListFilter> {
        self.snapshot().last_filter
    }
}

#[async_trait]
impl PickupPointRepo for MemoryStore {
    async fn create(&self, pvz: &PickupPoint) -> RepoResult<()> {
        self.tables()?.pvz.push(pvz.clone());
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tables()?.pvz.iter().any(|p| p.id == id))
    }

    async fn list_with_filter(&self, filter: &ListFilter) -> RepoResult<Vec<PvzListRow>> {
        let mut t = self.tables()?;
        t.last_filter = Some(*filter);

        let mut page: Vec<&PickupPoint> = t.pvz.iter().collect();
        page.sort_by_key(|p| p.id);
        let page = page
            .into_iter()
            .skip(filter.offset().max(0) as usize)
            .take(filter.limit.max(0) as usize);

        let mut rows = Vec::new();
        for p in page {
            let mut recs: Vec<&Reception> = t
                .receptions
                .iter()
                .filter(|r| r.pvz_id == p.id)
                .filter(|r| filter.start.map_or(true, |s| r.date_time >= s))
                .filter(|r| filter.end.map_or(true, |e| r.date_time <= e))
                .collect();
            recs.sort_by_key(|r| (r.date_time, r.id));
            for r in recs {
                let row = PvzListRow {
                    pvz_id: p.id,
                    registration_date: p.registration_date,
                    city: p.city.code(),
                    reception_id: r.id,
                    reception_date_time: r.date_time,
                    status: r.status.code(),
                    item_id: None,
                    item_date_time: None,
                    item_type: None,
                };
                let mut items: Vec<&Item> =
                    t.items.iter().filter(|i| i.reception_id == r.id).collect();
                items.sort_by_key(|i| i.date_time);
                if items.is_empty() {
                    rows.push(row);
                    continue;
                }
                for i in items {
                    rows.push(PvzListRow {
                        item_id: Some(i.id),
                        item_date_time: Some(i.date_time),
                        item_type: Some(i.item_type.code()),
                        ..row.clone()
                    });
                }
            }
        }
        Ok(rows)
    }

    async fn list_all(&self) -> RepoResult<Vec<PickupPoint>> {
        let mut all = self.tables()?.pvz.clone();
        all.sort_by_key(|p| (p.registration_date, p.id));
        Ok(all)
    }
}

#[async_trait]
impl ReceptionRepo for MemoryStore {
    async fn create(&self, reception: &Reception) -> RepoResult<()> {
        let mut t = self.tables()?;
        let open_exists = t
            .receptions
            .iter()
            .any(|r| r.pvz_id == reception.pvz_id && r.status == ReceptionStatus::Open);
        if reception.status == ReceptionStatus::Open && open_exists {
            return Err(RepoError::Conflict);
        }
        t.receptions.push(reception.clone());
        Ok(())
    }

    async fn find_open(&self, pvz_id: Uuid) -> RepoResult<Option<Reception>> {
        let t = self.tables()?;
        if self.hide_open.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(t
            .receptions
            .iter()
            .find(|r| r.pvz_id == pvz_id && r.status == ReceptionStatus::Open)
            .cloned())
    }

    async fn close(&self, id: Uuid) -> RepoResult<bool> {
        let mut t = self.tables()?;
        match t
            .receptions
            .iter_mut()
            .find(|r| r.id == id && r.status == ReceptionStatus::Open)
        {
            Some(r) => {
                r.status = ReceptionStatus::Closed;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ItemRepo for MemoryStore {
    async fn create(&self, item: &Item) -> RepoResult<()> {
        let mut t = self.tables()?;
        let open = t
            .receptions
            .iter()
            .any(|r| r.id == item.reception_id && r.status == ReceptionStatus::Open);
        if !open {
            return Err(RepoError::Conflict);
        }
        t.items.push(item.clone());
        Ok(())
    }

    async fn count_by_reception(&self, reception_id: Uuid) -> RepoResult<i64> {
        let t = self.tables()?;
        Ok(t.items.iter().filter(|i| i.reception_id == reception_id).count() as i64)
    }

    async fn delete_latest(&self, reception_id: Uuid) -> RepoResult<bool> {
        let mut t = self.tables()?;
        // ties go to the later insert
        let newest = t
            .items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.reception_id == reception_id)
            .max_by_key(|(idx, i)| (i.date_time, *idx))
            .map(|(idx, _)| idx);
        match newest {
            Some(idx) => {
                t.items.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut t = self.tables()?;
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict);
        }
        t.users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.tables()?.users.iter().find(|u| u.email == email).cloned())
    }
}

/// Advances one second per reading.
pub struct StepClock {
    next: Mutex<OffsetDateTime>,
}

impl Default for StepClock {
    fn default() -> Self {
        Self {
            next: Mutex::new(datetime!(2025-04-01 12:00 UTC)),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> OffsetDateTime {
        let mut next = self.next.lock().expect("clock lock");
        let now = *next;
        *next += Duration::seconds(1);
        now
    }
}

pub struct PlainHasher;

impl HashService for PlainHasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        Ok(format!("plain:{plain}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(plain)
    }
}

/// Tokens are `token:<role>`.
pub struct StaticTokens;

impl TokenService for StaticTokens {
    fn issue(&self, role: Role) -> anyhow::Result<String> {
        Ok(format!("token:{}", role.as_str()))
    }

    fn claims(&self, token: &str) -> anyhow::Result<String> {
        token
            .strip_prefix("token:")
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("malformed token"))
    }
}
