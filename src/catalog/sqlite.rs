use crate::model::{GroupStats, LaptopSpecs, Listing, PricePoint, StorageError};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const LISTING_COLUMNS: &str = "id, feed, title, description, price, list_price, currency, rating, reviews, url,
     specs, first_seen, last_seen";

/// What `save_listing` did with a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaveOutcome {
    Inserted,
    PriceChanged { previous: Option<f64> },
    Unchanged,
}

pub struct CatalogStorage {
    conn: Connection,
}

impl CatalogStorage {
    /// Opens the catalog file and creates or migrates its tables.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::from_connection(Connection::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS listings (
                id TEXT PRIMARY KEY,
                feed TEXT NOT NULL,
                title TEXT NOT NULL,
                price REAL,
                list_price REAL,
                currency TEXT,
                rating REAL,
                reviews INTEGER,
                url TEXT,
                specs TEXT NOT NULL,
                brand TEXT,
                model TEXT,
                processor TEXT,
                ram TEXT,
                storage TEXT,
                graphics TEXT,
                screen TEXT,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_listings_feed ON listings(feed);

            CREATE TABLE IF NOT EXISTS price_history (
                listing_id TEXT NOT NULL,
                price REAL NOT NULL,
                seen_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_price_history_listing ON price_history(listing_id);

            CREATE TABLE IF NOT EXISTS group_stats (
                group_name TEXT PRIMARY KEY,
                count INTEGER NOT NULL,
                avg_price REAL NOT NULL,
                std_dev REAL NOT NULL,
                min_price REAL NOT NULL,
                max_price REAL NOT NULL,
                last_updated TEXT NOT NULL
            );
            ",
        )?;

        // Columns added after the first catalog release.
        Self::migrate_add_column_if_missing(&conn, "listings", "description", "TEXT NOT NULL DEFAULT ''")?;
        Self::migrate_add_column_if_missing(&conn, "listings", "operating_system", "TEXT")?;

        Ok(Self { conn })
    }

    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    /// Inserts or updates a listing. `first_seen` of an existing row is kept,
    /// and a history row is appended whenever the price changes.
    pub fn save_listing(&self, listing: &Listing) -> Result<SaveOutcome, StorageError> {
        let exists = self
            .conn
            .query_row("SELECT 1 FROM listings WHERE id = ?1", params![&listing.id], |_| Ok(()))
            .optional()?
            .is_some();
        let previous = self.latest_price(&listing.id)?;

        let specs = serde_json::to_string(&listing.specs)?;
        let s = &listing.specs;
        self.conn.execute(
            "INSERT INTO listings (
                id, feed, title, description, price, list_price, currency, rating, reviews, url,
                specs, brand, model, processor, ram, storage, graphics, screen, operating_system,
                first_seen, last_seen
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
            ON CONFLICT(id) DO UPDATE SET
                feed = excluded.feed,
                title = excluded.title,
                description = excluded.description,
                price = excluded.price,
                list_price = excluded.list_price,
                currency = excluded.currency,
                rating = excluded.rating,
                reviews = excluded.reviews,
                url = excluded.url,
                specs = excluded.specs,
                brand = excluded.brand,
                model = excluded.model,
                processor = excluded.processor,
                ram = excluded.ram,
                storage = excluded.storage,
                graphics = excluded.graphics,
                screen = excluded.screen,
                operating_system = excluded.operating_system,
                last_seen = excluded.last_seen",
            params![
                &listing.id,
                &listing.feed,
                &listing.title,
                &listing.description,
                &listing.price,
                &listing.list_price,
                &listing.currency,
                &listing.rating,
                &listing.reviews_count,
                &listing.url,
                &specs,
                s.brand_label(),
                s.model_label(),
                s.processor_label(),
                s.ram_label(),
                s.storage_label(),
                s.graphics_label(),
                s.screen_label(),
                &s.operating_system,
                &listing.first_seen.to_rfc3339(),
                &listing.last_seen.to_rfc3339(),
            ],
        )?;

        let Some(price) = listing.price else {
            return Ok(if exists { SaveOutcome::Unchanged } else { SaveOutcome::Inserted });
        };
        let changed = previous.is_none_or(|p| (p - price).abs() > f64::EPSILON);
        if changed {
            self.conn.execute(
                "INSERT INTO price_history (listing_id, price, seen_at) VALUES (?1, ?2, ?3)",
                params![&listing.id, price, &listing.last_seen.to_rfc3339()],
            )?;
        }
        Ok(match (exists, changed) {
            (false, _) => SaveOutcome::Inserted,
            (true, true) => SaveOutcome::PriceChanged { previous },
            (true, false) => SaveOutcome::Unchanged,
        })
    }

    fn latest_price(&self, listing_id: &str) -> Result<Option<f64>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT price FROM price_history WHERE listing_id = ?1
                 ORDER BY seen_at DESC, rowid DESC LIMIT 1",
                params![listing_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Removes listings of `feed` whose ids are not in `current_ids`, along
    /// with their price history. Returns how many listings were removed.
    pub fn delete_missing_for_feed(&self, feed: &str, current_ids: &[String]) -> Result<usize, StorageError> {
        let deleted = if current_ids.is_empty() {
            self.conn.execute("DELETE FROM listings WHERE feed = ?1", params![feed])?
        } else {
            let placeholders = current_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!(
                "DELETE FROM listings WHERE feed = ?1 AND id NOT IN ({})",
                placeholders
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut params_vec = vec![feed.to_string()];
            params_vec.extend(current_ids.iter().cloned());
            stmt.execute(rusqlite::params_from_iter(params_vec))?
        };
        self.conn.execute(
            "DELETE FROM price_history WHERE listing_id NOT IN (SELECT id FROM listings)",
            [],
        )?;
        Ok(deleted)
    }

    pub fn get_listing(&self, id: &str) -> Result<Option<Listing>, StorageError> {
        let sql = format!("SELECT {} FROM listings WHERE id = ?1", LISTING_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::map_listing)
            .optional()?)
    }

    /// Every listing, in insertion order.
    pub fn all_listings(&self) -> Result<Vec<Listing>, StorageError> {
        let sql = format!("SELECT {} FROM listings ORDER BY rowid", LISTING_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_listing)?;
        let mut listings = Vec::new();
        for listing in rows {
            listings.push(listing?);
        }
        Ok(listings)
    }

    /// Price history, oldest first; all listings when `listing_id` is `None`.
    pub fn price_history(&self, listing_id: Option<&str>) -> Result<Vec<PricePoint>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT listing_id, price, seen_at FROM price_history
             WHERE ?1 IS NULL OR listing_id = ?1
             ORDER BY seen_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![listing_id], |row| {
            Ok(PricePoint {
                listing_id: row.get(0)?,
                price: row.get(1)?,
                seen_at: parse_timestamp(row, 2)?,
            })
        })?;
        let mut points = Vec::new();
        for point in rows {
            points.push(point?);
        }
        Ok(points)
    }

    pub fn get_stats(&self, group: &str) -> Result<Option<GroupStats>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT group_name, count, avg_price, std_dev, min_price, max_price, last_updated
                 FROM group_stats WHERE group_name = ?1",
                params![group],
                Self::map_stats,
            )
            .optional()?)
    }

    pub fn all_stats(&self) -> Result<Vec<GroupStats>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT group_name, count, avg_price, std_dev, min_price, max_price, last_updated
             FROM group_stats ORDER BY group_name ASC",
        )?;
        let rows = stmt.query_map([], Self::map_stats)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn update_stats(&self, stats: &GroupStats) -> Result<(), StorageError> {
        write_stats(&self.conn, stats)
    }

    /// Makes `stats` the complete set of group statistics: groups not in it
    /// are deleted, the rest upserted, in one transaction. Returns how many
    /// stale groups were removed.
    pub fn replace_stats(&self, stats: &[GroupStats]) -> Result<usize, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = if stats.is_empty() {
            tx.execute("DELETE FROM group_stats", [])?
        } else {
            let placeholders = stats.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!("DELETE FROM group_stats WHERE group_name NOT IN ({})", placeholders);
            tx.execute(&sql, rusqlite::params_from_iter(stats.iter().map(|s| s.group.as_str())))?
        };
        for group in stats {
            write_stats(&tx, group)?;
        }
        tx.commit()?;
        Ok(removed)
    }

    fn map_listing(row: &Row) -> Result<Listing, rusqlite::Error> {
        let specs_json: String = row.get(10)?;
        let specs: LaptopSpecs = serde_json::from_str(&specs_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?;

        Ok(Listing {
            id: row.get(0)?,
            feed: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            price: row.get(4)?,
            list_price: row.get(5)?,
            currency: row.get(6)?,
            rating: row.get(7)?,
            reviews_count: row.get(8)?,
            url: row.get(9)?,
            specs,
            first_seen: parse_timestamp(row, 11)?,
            last_seen: parse_timestamp(row, 12)?,
        })
    }

    fn map_stats(row: &Row) -> Result<GroupStats, rusqlite::Error> {
        Ok(GroupStats {
            group: row.get(0)?,
            count: row.get(1)?,
            avg_price: row.get(2)?,
            std_dev: row.get(3)?,
            min_price: row.get(4)?,
            max_price: row.get(5)?,
            last_updated: parse_timestamp(row, 6)?,
        })
    }
}

fn write_stats(conn: &Connection, stats: &GroupStats) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO group_stats
            (group_name, count, avg_price, std_dev, min_price, max_price, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &stats.group,
            &stats.count,
            &stats.avg_price,
            &stats.std_dev,
            &stats.min_price,
            &stats.max_price,
            &stats.last_updated.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn parse_timestamp(row: &Row, index: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(index)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}
