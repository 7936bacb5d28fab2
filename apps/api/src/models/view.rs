use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on retained view events for backends that store the whole
/// event list as one value. Oldest events are evicted in insertion order.
pub const MAX_RETAINED_EVENTS: usize = 10_000;

/// One recorded page visit. Append-only; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEvent {
    pub ip: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Wire/file shape of the stored event list: `{"views": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ViewLog {
    #[serde(default)]
    pub views: Vec<ViewEvent>,
}

impl ViewLog {
    /// Appends one event and evicts the oldest entries beyond the retention cap.
    pub fn append(&mut self, event: ViewEvent) {
        self.views.push(event);
        let excess = self.views.len().saturating_sub(MAX_RETAINED_EVENTS);
        if excess > 0 {
            self.views.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ip: &str) -> ViewEvent {
        ViewEvent {
            ip: ip.to_string(),
            country: None,
            network: None,
            timestamp: Utc::now(),
            user_agent: None,
        }
    }

    #[test]
    fn test_append_below_cap_keeps_everything() {
        let mut log = ViewLog::default();
        log.append(event("1.1.1.1"));
        log.append(event("2.2.2.2"));
        assert_eq!(log.views.len(), 2);
        assert_eq!(log.views[0].ip, "1.1.1.1");
    }

    #[test]
    fn test_append_at_cap_evicts_oldest() {
        let mut log = ViewLog {
            views: (0..MAX_RETAINED_EVENTS)
                .map(|i| event(&format!("10.0.0.{i}")))
                .collect(),
        };
        log.append(event("fresh"));
        assert_eq!(log.views.len(), MAX_RETAINED_EVENTS);
        // Oldest entry is gone, newest is last, relative order preserved.
        assert_eq!(log.views[0].ip, "10.0.0.1");
        assert_eq!(log.views[MAX_RETAINED_EVENTS - 1].ip, "fresh");
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let json = serde_json::to_value(event("1.2.3.4")).unwrap();
        assert!(json.get("userAgent").is_some());
        assert!(json.get("user_agent").is_none());
    }
}
