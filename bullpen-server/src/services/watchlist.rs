use chrono::Utc;
use uuid::Uuid;

use bullpen_types::{Paginated, Ticker, WatchlistEntry};

use crate::db::repositories::{TickerRepository, WatchlistRepository};
use crate::db::Database;
use crate::error::{ConflictReason, CoreError, CoreResult, InvalidReason};
use crate::pagination::PageRequest;
use crate::ticker::normalize_symbol;

pub struct WatchlistService {
    watchlist: WatchlistRepository,
    tickers: TickerRepository,
}

fn symbol_or_invalid(raw: &str) -> CoreResult<String> {
    normalize_symbol(raw).ok_or(CoreError::InvalidState(InvalidReason::InvalidSymbol))
}

impl WatchlistService {
    pub fn new(db: &Database) -> Self {
        Self {
            watchlist: WatchlistRepository::new(db.pool.clone()),
            tickers: TickerRepository::new(db.pool.clone()),
        }
    }

    /// Watch a symbol, creating its ticker row on first use
    pub fn add(&self, user_id: &Uuid, symbol: &str) -> CoreResult<Ticker> {
        let symbol = symbol_or_invalid(symbol)?;
        let ticker = self.tickers.get_or_create(&symbol)?;
        if !self.watchlist.add(user_id, &ticker.id, Utc::now())? {
            return Err(CoreError::Conflict(ConflictReason::AlreadyInWatchlist));
        }
        tracing::debug!(user_id = %user_id, symbol = %ticker.symbol, "watchlist item added");
        Ok(ticker)
    }

    pub fn remove(&self, user_id: &Uuid, symbol: &str) -> CoreResult<bool> {
        let symbol = symbol_or_invalid(symbol)?;
        Ok(self.watchlist.remove(user_id, &symbol)?)
    }

    pub fn list(&self, user_id: &Uuid, page: PageRequest) -> CoreResult<Paginated<WatchlistEntry>> {
        let window = self.watchlist.list(user_id, page)?;
        Ok(page.paginate(window.items, window.total))
    }
}
