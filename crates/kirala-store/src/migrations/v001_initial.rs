//! v001 -- Initial schema creation.
//!
//! Creates the six marketplace collections (`users`, `toys`, `rentals`,
//! `rooms`, `messages`, `friends`) and the single-row settings table.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id           TEXT PRIMARY KEY NOT NULL,   -- opaque provider id
    display_name TEXT,
    email        TEXT,
    phone        TEXT,
    photo_url    TEXT,
    city         TEXT,
    age          INTEGER,
    gender       TEXT,                        -- boy / girl / unisex
    payout_iban  TEXT,
    friend_code  TEXT NOT NULL UNIQUE,        -- 6 digits, shareable
    created_at   TEXT NOT NULL                -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Toys (listings)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS toys (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    owner_id      TEXT NOT NULL,              -- FK -> users(id), advisory
    name          TEXT NOT NULL,
    description   TEXT NOT NULL,
    city          TEXT NOT NULL,
    age_range     TEXT NOT NULL,              -- "min-max"
    price_per_day INTEGER NOT NULL,           -- TL per day
    categories    TEXT NOT NULL,              -- JSON array of strings
    gender        TEXT,                       -- boy / girl / unisex, optional
    image_url     TEXT,
    is_available  INTEGER NOT NULL DEFAULT 1, -- boolean 0/1
    rented_by     TEXT,                       -- current renter, nullable
    rented_at     TEXT,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_toys_city ON toys(city);
CREATE INDEX IF NOT EXISTS idx_toys_owner ON toys(owner_id);
CREATE INDEX IF NOT EXISTS idx_toys_rented_by ON toys(rented_by);
CREATE INDEX IF NOT EXISTS idx_toys_created ON toys(created_at DESC);

-- ----------------------------------------------------------------
-- Rentals
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS rentals (
    id             TEXT PRIMARY KEY NOT NULL, -- UUID v4
    toy_id         TEXT NOT NULL,             -- FK -> toys(id)
    toy_name       TEXT NOT NULL,             -- denormalized for lists
    renter_id      TEXT NOT NULL,
    owner_id       TEXT NOT NULL,
    days           INTEGER NOT NULL,
    total_price    INTEGER NOT NULL,
    payment_method TEXT NOT NULL,             -- eft / card
    sender_name    TEXT,                      -- EFT attestation
    sender_bank    TEXT,
    card_last_four TEXT,                      -- card path only
    status         TEXT NOT NULL,             -- waiting_approval / active / completed
    created_at     TEXT NOT NULL,
    approved_at    TEXT,
    returned_at    TEXT,

    FOREIGN KEY (toy_id) REFERENCES toys(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_rentals_owner_status ON rentals(owner_id, status);
CREATE INDEX IF NOT EXISTS idx_rentals_renter ON rentals(renter_id);
CREATE INDEX IF NOT EXISTS idx_rentals_status ON rentals(status);

-- ----------------------------------------------------------------
-- Rooms (1:1 chats, keyed by the sorted participant pair)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS rooms (
    id            TEXT PRIMARY KEY NOT NULL,  -- "{low}_{high}"
    participant_a TEXT NOT NULL,              -- lexicographically lower id
    participant_b TEXT NOT NULL,
    toy_id        TEXT,                       -- listing the chat started from
    toy_name      TEXT,
    last_message  TEXT,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_rooms_participant_a ON rooms(participant_a);
CREATE INDEX IF NOT EXISTS idx_rooms_participant_b ON rooms(participant_b);
CREATE INDEX IF NOT EXISTS idx_rooms_updated ON rooms(updated_at DESC);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id               TEXT PRIMARY KEY NOT NULL, -- UUID v4
    room_id          TEXT NOT NULL,             -- FK -> rooms(id)
    sender_id        TEXT NOT NULL,
    sender_name      TEXT NOT NULL,             -- denormalized
    sender_photo_url TEXT,
    text             TEXT,                      -- text and/or image
    image_url        TEXT,
    created_at       TEXT NOT NULL,

    FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_room_ts
    ON messages(room_id, created_at ASC);

-- ----------------------------------------------------------------
-- Friends (denormalized contact list per user)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS friends (
    owner_id     TEXT NOT NULL,
    friend_id    TEXT NOT NULL,
    display_name TEXT,
    photo_url    TEXT,
    friend_code  TEXT NOT NULL,
    added_at     TEXT NOT NULL,

    PRIMARY KEY (owner_id, friend_id)
);

-- ----------------------------------------------------------------
-- Client-local settings (single JSON row)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS app_settings (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    json TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
