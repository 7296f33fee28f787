use chrono::Duration;

/// How the conversation store bounds its memory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Keep every conversation for the life of the process
    #[default]
    Unbounded,
    /// Keep at most this many conversations, dropping the least recently active
    MaxEntries(usize),
    /// Drop conversations that have not been used for this long
    Idle(Duration),
}

impl EvictionPolicy {
    pub(crate) fn max_entries(&self) -> Option<usize> {
        match self {
            EvictionPolicy::MaxEntries(max) => Some(*max),
            _ => None,
        }
    }

    pub(crate) fn idle_limit(&self) -> Option<Duration> {
        match self {
            EvictionPolicy::Idle(limit) => Some(*limit),
            _ => None,
        }
    }
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::Unbounded => write!(f, "unbounded"),
            EvictionPolicy::MaxEntries(max) => write!(f, "max {} entries", max),
            EvictionPolicy::Idle(limit) => write!(f, "idle {}s", limit.num_seconds()),
        }
    }
}
