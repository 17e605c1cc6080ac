//! SQL schema for the Economy Explorer SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Country dimension. Rows are never deleted; names are last-write-wins.
CREATE TABLE IF NOT EXISTS countries (
    country_code TEXT PRIMARY KEY CHECK (length(country_code) = 3),
    country_name TEXT NOT NULL,
    updated_at   TEXT NOT NULL      -- ISO 8601 UTC
);

-- One GDP fact per country per year. Values are whole currency units.
CREATE TABLE IF NOT EXISTS gdp_data (
    country_code   TEXT    NOT NULL REFERENCES countries(country_code),
    year           INTEGER NOT NULL,
    gdp            INTEGER NOT NULL,
    indicator_id   TEXT    NOT NULL,
    indicator_name TEXT    NOT NULL,
    unit           TEXT    NOT NULL,
    decimal_places INTEGER NOT NULL DEFAULT 0,
    updated_at     TEXT    NOT NULL,
    PRIMARY KEY (country_code, year)
);

-- Derived from gdp_data + countries; rewritten on every aggregation run.
CREATE TABLE IF NOT EXISTS continent_summaries (
    continent_code   TEXT    NOT NULL,   -- 'africa' | 'asia' | ...
    year             INTEGER NOT NULL,
    continent_name   TEXT    NOT NULL,
    total_gdp        INTEGER NOT NULL,
    average_gdp      INTEGER NOT NULL,
    country_count    INTEGER NOT NULL CHECK (country_count > 0),
    top_country_code TEXT    NOT NULL,
    top_country_name TEXT    NOT NULL,
    top_country_gdp  INTEGER NOT NULL,
    updated_at       TEXT    NOT NULL,
    PRIMARY KEY (continent_code, year)
);

CREATE INDEX IF NOT EXISTS gdp_data_year_idx ON gdp_data(year);

PRAGMA user_version = 1;
";
