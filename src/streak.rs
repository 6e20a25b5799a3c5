//! Daily challenges, and the streak of consecutive days they have been played

use chrono::{Local, NaiveDate, TimeZone};

use crate::traits::KeyValueStore;

pub const STREAK_KEY: &str = "streak";
/// The last played day is stored as the timestamp (in milliseconds) of its local midnight
pub const LAST_PLAYED_KEY: &str = "last_played";

static CHALLENGES: &[&str] = &[
    "🔥 Do 10 push-ups!",
    "😊 Say something nice to yourself!",
    "😂 Tell a joke to a friend!",
    "🤸 Stretch for 30 seconds!",
    "🎵 Dance to your favorite song!",
    "📖 Read 1 page of a book!",
];

/// A small task to do today
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Challenge(&'static str);

impl Challenge {
    /// Pick a challenge at random. The random bits of a v4 UUID are enough for this
    pub fn random() -> Self {
        let index = uuid::Uuid::new_v4().as_u128() % CHALLENGES.len() as u128;
        Challenge(CHALLENGES[index as usize])
    }

    pub fn all() -> impl Iterator<Item = Challenge> {
        CHALLENGES.iter().map(|text| Challenge(*text))
    }

    pub fn text(&self) -> &'static str {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Streak {
    pub count: u32,
    pub last_played: Option<NaiveDate>,
}

/// Reads and updates the streak in a key-value store.
///
/// Storage errors are logged, and the updated streak is returned anyway.
pub struct StreakTracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StreakTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The streak, as currently stored
    pub async fn current(&self) -> Streak {
        let count = match self.read(STREAK_KEY).await {
            None => 0,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Invalid stored streak {:?}", raw);
                0
            }),
        };
        let last_played = self.read(LAST_PLAYED_KEY).await.and_then(|raw| decode_day(&raw));
        Streak { count, last_played }
    }

    /// Update the streak when the challenges are opened on `today`
    pub async fn check(&self, today: NaiveDate) -> Streak {
        let stored = self.current().await;
        let count = match stored.last_played {
            None => 1,
            Some(last) => match (today - last).num_days() {
                0 => stored.count.max(1),
                1 => stored.count.saturating_add(1),
                n if n < 0 => {
                    log::warn!("The last played day ({}) is in the future", last);
                    stored.count.max(1)
                },
                _ => 1,
            },
        };

        let streak = Streak { count, last_played: Some(today.max(stored.last_played.unwrap_or(today))) };
        if streak != stored {
            self.save(&streak).await;
        }
        streak
    }

    /// Mark today's challenge as done
    pub async fn complete_challenge(&self, today: NaiveDate) -> Streak {
        let stored = self.current().await;
        let streak = Streak { count: stored.count.saturating_add(1), last_played: Some(today) };
        self.save(&streak).await;
        log::info!("Challenge completed, the streak is now {} days", streak.count);
        streak
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get_blob(key).await {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Unable to read {}: {}", key, err);
                None
            }
        }
    }

    async fn save(&self, streak: &Streak) {
        if let Err(err) = self.store.set_blob(STREAK_KEY, &streak.count.to_string()).await {
            log::warn!("Unable to save the streak: {}", err);
        }
        if let Some(day) = streak.last_played.and_then(encode_day) {
            if let Err(err) = self.store.set_blob(LAST_PLAYED_KEY, &day).await {
                log::warn!("Unable to save the last played day: {}", err);
            }
        }
    }
}

fn encode_day(day: NaiveDate) -> Option<String> {
    let midnight = Local.from_local_datetime(&day.and_hms_opt(0, 0, 0)?).earliest()?;
    Some(midnight.timestamp_millis().to_string())
}

fn decode_day(raw: &str) -> Option<NaiveDate> {
    let millis: i64 = match raw.trim().parse() {
        Ok(m) => m,
        Err(_) => {
            log::warn!("Invalid stored day {:?}", raw);
            return None;
        }
    };
    Local.timestamp_millis_opt(millis).single().map(|dt| dt.date_naive())
}
