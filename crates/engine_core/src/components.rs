//! Common ECS components used across the engine.

/// Display name of an entity (may be empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Slack for accumulated float error when frame deltas sum to the limit.
const LIFETIME_EPSILON: f32 = 1e-4;

/// Lifetime counter for temporary entities (projectiles, effects).
/// Counts up and reports expiry once the limit is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub elapsed: f32,
    pub limit: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self {
            elapsed: 0.0,
            limit: seconds,
        }
    }

    /// Advance the counter. Returns true once the limit has been passed.
    pub fn update(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed + LIFETIME_EPSILON >= self.limit
    }
}
