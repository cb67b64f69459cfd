use crate::conversion::MAX_QUANTITY;
use crate::model::{ItemKind, PriceUnit};
use crate::profile::Profile;
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS holdings (
        item        TEXT PRIMARY KEY,
        quantity    INTEGER NOT NULL DEFAULT 0,
        min_reserve INTEGER NOT NULL DEFAULT 0,
        auto_repeat INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE IF NOT EXISTS prices (
        item  TEXT PRIMARY KEY,
        value REAL NOT NULL DEFAULT 0,
        unit  TEXT NOT NULL DEFAULT 'currency_per_item'
    );
";

pub fn open_store<P: AsRef<Path>>(path: P) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

pub fn open_in_memory() -> StoreResult<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

pub fn load_profile(conn: &Connection) -> StoreResult<Profile> {
    let mut profile = Profile::new();

    let mut stmt = conn.prepare("SELECT item, quantity, min_reserve, auto_repeat FROM holdings")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    for row in rows {
        let (name, quantity, min_reserve, auto_repeat) = match row {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "skipping malformed holdings row");
                continue;
            }
        };
        let Some(kind) = ItemKind::from_name(&name) else {
            debug!(item = %name, "skipping holdings row for unknown item");
            continue;
        };
        profile.set_quantity(kind, quantity);
        profile.set_min_reserve(kind, min_reserve);
        profile.set_auto_repeat(kind, auto_repeat != 0);
    }

    let mut stmt = conn.prepare("SELECT item, value, unit FROM prices")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, f64>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    for row in rows {
        let (name, value, unit) = match row {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "skipping malformed price row");
                continue;
            }
        };
        let (Some(kind), Some(unit)) = (ItemKind::from_name(&name), PriceUnit::from_key(&unit)) else {
            debug!(item = %name, unit = %unit, "skipping price row");
            continue;
        };
        profile.set_price(kind, value, unit);
    }

    Ok(profile)
}

pub fn save_profile(conn: &mut Connection, profile: &Profile) -> StoreResult<()> {
    let tx = conn.transaction()?;
    {
        let mut holdings = tx.prepare(
            "INSERT INTO holdings (item, quantity, min_reserve, auto_repeat)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(item) DO UPDATE SET
                quantity = excluded.quantity,
                min_reserve = excluded.min_reserve,
                auto_repeat = excluded.auto_repeat",
        )?;
        let mut prices = tx.prepare(
            "INSERT INTO prices (item, value, unit)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(item) DO UPDATE SET
                value = excluded.value,
                unit = excluded.unit",
        )?;

        for kind in ItemKind::ALL {
            holdings.execute(params![
                kind.display_name(),
                to_sql_count(profile.quantity(kind)),
                to_sql_count(profile.min_reserve(kind)),
                profile.auto_repeat(kind) as i64,
            ])?;
            let price = profile.price(kind);
            prices.execute(params![kind.display_name(), price.value, price.unit.key()])?;
        }
    }
    tx.commit()?;
    debug!("saved profile");
    Ok(())
}

fn to_sql_count(value: u64) -> i64 {
    // MAX_QUANTITY is below i64::MAX
    value.min(MAX_QUANTITY) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_store_loads_defaults() {
        let conn = open_in_memory().unwrap();
        assert_eq!(load_profile(&conn).unwrap(), Profile::new());
    }

    #[test]
    fn save_then_load_on_disk() {
        let file = NamedTempFile::new().unwrap();

        let mut profile = Profile::new();
        profile.set_quantity(ItemKind::Sponge, 120);
        profile.set_min_reserve(ItemKind::Sponge, 20);
        profile.set_auto_repeat(ItemKind::Catheter, false);
        profile.set_price(ItemKind::Gauze, 8.0, PriceUnit::ItemsPerCurrency);

        {
            let mut conn = open_store(file.path()).unwrap();
            save_profile(&mut conn, &profile).unwrap();
            // saving twice must upsert, not fail on the primary key
            save_profile(&mut conn, &profile).unwrap();
        }

        let conn = open_store(file.path()).unwrap();
        let loaded = load_profile(&conn).unwrap();
        assert_eq!(loaded, profile);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM holdings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 13);
    }

    #[test]
    fn unknown_rows_are_ignored_and_negatives_clamped() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO holdings VALUES ('Mop', 50, 0, 1);
             INSERT INTO holdings VALUES ('swab', -10, -3, 0);
             INSERT INTO prices VALUES ('Splint', 2.5, 'per_dozen');
             INSERT INTO prices VALUES ('Scalpel', -1.0, 'currency_per_item');
             INSERT INTO prices VALUES ('Forceps', 4.0, 'items_per_currency');",
        )
        .unwrap();

        let p = load_profile(&conn).unwrap();
        assert_eq!(p.quantity(ItemKind::Swab), 0);
        assert_eq!(p.min_reserve(ItemKind::Swab), 0);
        assert!(!p.auto_repeat(ItemKind::Swab));
        assert!(!p.price(ItemKind::Splint).is_priced());
        assert!(!p.price(ItemKind::Scalpel).is_priced());
        assert_eq!(p.price(ItemKind::Forceps).unit, PriceUnit::ItemsPerCurrency);
        assert_eq!(p.prices.value_of(ItemKind::Forceps), 0.25);
    }

    #[test]
    fn mistyped_rows_are_skipped() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO holdings VALUES ('Gauze', 'plenty', 0, 1);
             INSERT INTO holdings VALUES ('Splint', 60, 5, 1);
             INSERT INTO prices VALUES ('Gauze', 'cheap', 'currency_per_item');
             INSERT INTO prices VALUES ('Splint', 1.5, 'currency_per_item');",
        )
        .unwrap();

        let p = load_profile(&conn).unwrap();
        assert_eq!(p.quantity(ItemKind::Gauze), 0);
        assert!(!p.price(ItemKind::Gauze).is_priced());
        assert_eq!(p.quantity(ItemKind::Splint), 60);
        assert_eq!(p.min_reserve(ItemKind::Splint), 5);
        assert_eq!(p.price(ItemKind::Splint).value, 1.5);
    }

    #[test]
    fn oversized_counts_load_capped() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO holdings VALUES ('Syringe', ?1, ?1, 1)",
            params![i64::MAX],
        )
        .unwrap();

        let p = load_profile(&conn).unwrap();
        assert_eq!(p.quantity(ItemKind::Syringe), MAX_QUANTITY);
        assert_eq!(p.min_reserve(ItemKind::Syringe), MAX_QUANTITY);
        assert_eq!(to_sql_count(u64::MAX), MAX_QUANTITY as i64);
    }
}
