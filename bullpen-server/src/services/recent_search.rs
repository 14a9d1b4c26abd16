//! Per-user recent search history.
//!
//! Selecting a result again moves it to the top instead of adding a second
//! entry, and only the newest 20 entries are kept.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bullpen_types::{AddRecentSearchRequest, RecentSearch, RecentSearchKind};

use crate::db::repositories::RecentSearchRepository;
use crate::db::Database;
use crate::error::{CoreError, CoreResult, InvalidReason};
use crate::ticker::normalize_symbol;

pub const MAX_RECENT_SEARCHES: u32 = 20;

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Canonical result id so `$aapl` and `AAPL` land on the same entry
fn canonical_result_id(kind: RecentSearchKind, raw: &str) -> CoreResult<String> {
    let invalid = CoreError::InvalidState(InvalidReason::InvalidSearch);
    let raw = raw.trim();
    let id = match kind {
        RecentSearchKind::Ticker => normalize_symbol(raw).ok_or(invalid)?,
        RecentSearchKind::Account => {
            let name = raw.trim_start_matches('@');
            if name.is_empty() {
                return Err(invalid);
            }
            name.to_string()
        }
    };
    Ok(id)
}

pub struct RecentSearchService {
    db: Database,
    searches: RecentSearchRepository,
}

impl RecentSearchService {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            searches: RecentSearchRepository::new(db.pool.clone()),
        }
    }

    /// Newest first. `limit` defaults to and is capped at 20.
    pub fn list(&self, user_id: &Uuid, limit: Option<u32>) -> CoreResult<Vec<RecentSearch>> {
        let limit = limit.unwrap_or(MAX_RECENT_SEARCHES).clamp(1, MAX_RECENT_SEARCHES);
        Ok(self.searches.list(user_id, limit)?)
    }

    pub fn add(&self, user_id: &Uuid, request: AddRecentSearchRequest) -> CoreResult<RecentSearch> {
        self.add_at(user_id, request, Utc::now())
    }

    pub fn add_at(
        &self,
        user_id: &Uuid,
        request: AddRecentSearchRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<RecentSearch> {
        let kind = RecentSearchKind::parse_lenient(&request.kind);
        let result_id = canonical_result_id(kind, &request.result_id)?;
        let entry = RecentSearch {
            id: Uuid::new_v4(),
            kind,
            query: non_blank(Some(&request.query)).unwrap_or_else(|| result_id.clone()),
            result_id,
            result_display_name: non_blank(request.result_display_name.as_deref()),
            result_image_url: non_blank(request.result_image_url.as_deref()),
            created_at: now,
        };

        let trimmed = {
            let mut conn = self.db.connection()?;
            let tx = conn.transaction()?;
            RecentSearchRepository::record(&tx, user_id, &entry)?;
            let trimmed = RecentSearchRepository::trim(&tx, user_id, MAX_RECENT_SEARCHES)?;
            tx.commit()?;
            trimmed
        };
        tracing::debug!(
            user_id = %user_id,
            kind = entry.kind.as_str(),
            result_id = %entry.result_id,
            trimmed,
            "recent search recorded"
        );
        Ok(entry)
    }

    pub fn remove(&self, user_id: &Uuid, search_id: &Uuid) -> CoreResult<bool> {
        Ok(self.searches.remove(user_id, search_id)?)
    }

    pub fn clear(&self, user_id: &Uuid) -> CoreResult<usize> {
        let removed = self.searches.clear(user_id)?;
        tracing::debug!(user_id = %user_id, removed, "recent searches cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use chrono::Duration;

    fn ticker(symbol: &str) -> AddRecentSearchRequest {
        AddRecentSearchRequest {
            kind: "ticker".to_string(),
            result_id: symbol.to_string(),
            ..Default::default()
        }
    }

    fn result_ids(entries: &[RecentSearch]) -> Vec<&str> {
        entries.iter().map(|e| e.result_id.as_str()).collect()
    }

    #[test]
    fn test_search_again_moves_to_top() {
        let db = Database::in_memory().unwrap();
        let service = RecentSearchService::new(&db);
        let alice = insert_user(&db, "alice");
        let t0 = Utc::now() - Duration::hours(1);

        service.add_at(&alice, ticker("$aapl"), t0).unwrap();
        service.add_at(&alice, ticker("TSLA"), t0 + Duration::minutes(1)).unwrap();
        service
            .add_at(
                &alice,
                AddRecentSearchRequest {
                    kind: "account".to_string(),
                    result_id: "@bob".to_string(),
                    result_display_name: Some("Bob".to_string()),
                    ..Default::default()
                },
                t0 + Duration::minutes(2),
            )
            .unwrap();
        let again = service.add_at(&alice, ticker("AAPL"), t0 + Duration::minutes(3)).unwrap();
        assert_eq!(again.query, "AAPL");

        let entries = service.list(&alice, None).unwrap();
        assert_eq!(result_ids(&entries), vec!["AAPL", "bob", "TSLA"]);
        assert_eq!(entries[1].kind, RecentSearchKind::Account);
        assert_eq!(entries[1].result_display_name.as_deref(), Some("Bob"));
        assert_eq!(result_ids(&service.list(&alice, Some(1)).unwrap()), vec!["AAPL"]);
    }

    #[test]
    fn test_history_keeps_newest_twenty() {
        let db = Database::in_memory().unwrap();
        let service = RecentSearchService::new(&db);
        let alice = insert_user(&db, "alice");
        let t0 = Utc::now() - Duration::hours(1);

        for i in 0..=MAX_RECENT_SEARCHES {
            let symbol = format!("T{i}");
            service
                .add_at(&alice, ticker(&symbol), t0 + Duration::minutes(i64::from(i)))
                .unwrap();
        }

        let entries = service.list(&alice, Some(100)).unwrap();
        assert_eq!(entries.len(), MAX_RECENT_SEARCHES as usize);
        assert_eq!(entries[0].result_id, "T20");
        assert!(!entries.iter().any(|e| e.result_id == "T0"));
    }

    #[test]
    fn test_unknown_kind_is_ticker_and_blank_id_rejected() {
        let db = Database::in_memory().unwrap();
        let service = RecentSearchService::new(&db);
        let alice = insert_user(&db, "alice");

        let entry = service
            .add(
                &alice,
                AddRecentSearchRequest {
                    kind: "crypto".to_string(),
                    result_id: "btc".to_string(),
                    query: "bitcoin".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(entry.kind, RecentSearchKind::Ticker);
        assert_eq!(entry.result_id, "BTC");
        assert_eq!(entry.query, "bitcoin");

        assert!(matches!(
            service.add(&alice, ticker("   ")),
            Err(CoreError::InvalidState(InvalidReason::InvalidSearch))
        ));
    }

    #[test]
    fn test_remove_and_clear_are_per_user() {
        let db = Database::in_memory().unwrap();
        let service = RecentSearchService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");

        let mine = service.add(&alice, ticker("SPY")).unwrap();
        service.add(&alice, ticker("QQQ")).unwrap();
        service.add(&bob, ticker("SPY")).unwrap();

        assert!(!service.remove(&bob, &mine.id).unwrap());
        assert!(service.remove(&alice, &mine.id).unwrap());
        assert_eq!(result_ids(&service.list(&alice, None).unwrap()), vec!["QQQ"]);

        assert_eq!(service.clear(&alice).unwrap(), 1);
        assert!(service.list(&alice, None).unwrap().is_empty());
        assert_eq!(service.list(&bob, None).unwrap().len(), 1);
    }
}
