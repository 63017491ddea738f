use {
    chrono::{DateTime, Utc},
    parking_lot::Mutex,
};

/// Width of one naming tick in milliseconds.
const TICK_MS: i64 = 10;
/// Names handed out per tick before the tick is moved forward.
const NAMES_PER_TICK: u8 = 10;

#[derive(Debug, Default)]
struct NameState {
    last_tick: i64,
    counter: u8,
}

/// Generates names such as `SQL261019134501230` for unnamed constraints
/// and other objects: a timestamp down to hundredths of a second followed
/// by a counter digit.
#[derive(Debug, Default)]
pub(crate) struct SystemNameGenerator {
    state: Mutex<NameState>,
}

impl SystemNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&self) -> String {
        self.next_name_at(Utc::now().timestamp_millis())
    }

    fn next_name_at(&self, now_ms: i64) -> String {
        let now = now_ms / TICK_MS * TICK_MS;

        let mut state = self.state.lock();
        if now > state.last_tick {
            state.last_tick = now;
            state.counter = 0;
        } else {
            // same tick, or the clock went backwards
            state.counter += 1;
            if state.counter == NAMES_PER_TICK {
                state.counter = 0;
                state.last_tick += TICK_MS;
            }
        }

        let at = DateTime::from_timestamp_millis(state.last_tick).unwrap_or_default();
        format!(
            "SQL{}{:02}{}",
            at.format("%y%m%d%H%M%S"),
            at.timestamp_subsec_millis() / 10,
            state.counter
        )
    }
}
