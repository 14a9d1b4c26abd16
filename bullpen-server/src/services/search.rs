use bullpen_types::{Paginated, TickerSummary, UserSummary};

use crate::db::repositories::{TickerRepository, UserRepository};
use crate::db::Database;
use crate::error::CoreResult;
use crate::pagination::PageRequest;

/// Substring search over users and tickers. A blank query matches nothing.
pub struct SearchService {
    users: UserRepository,
    tickers: TickerRepository,
}

impl SearchService {
    pub fn new(db: &Database) -> Self {
        Self {
            users: UserRepository::new(db.pool.clone()),
            tickers: TickerRepository::new(db.pool.clone()),
        }
    }

    pub fn users(&self, query: &str, page: PageRequest) -> CoreResult<Paginated<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(page.paginate(Vec::new(), 0));
        }
        let window = self.users.search(query, page)?;
        Ok(page.paginate(window.items, window.total))
    }

    pub fn tickers(&self, query: &str, page: PageRequest) -> CoreResult<Paginated<TickerSummary>> {
        let query = query.trim().trim_start_matches(['$', '#']);
        if query.is_empty() {
            return Ok(page.paginate(Vec::new(), 0));
        }
        let window = self.tickers.search(query, page)?;
        Ok(page.paginate(window.items, window.total))
    }
}
