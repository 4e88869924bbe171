/// Topic names under one base topic (e.g. `k2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    base: String,
}

impl Topics {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { base: base.trim_end_matches('/').to_string() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Patterns the trainer UI subscribes to.
    pub fn subscriptions(&self) -> Vec<String> {
        ["status/+", "kettler/+", "log/+"]
            .iter()
            .map(|suffix| self.topic(suffix))
            .collect()
    }

    pub fn power_command(&self) -> String {
        self.topic("kettler/cmnd/power")
    }

    pub fn logger_start(&self) -> String {
        self.topic("logger/cmnd/start")
    }

    pub fn logger_stop(&self) -> String {
        self.topic("logger/cmnd/stop")
    }

    /// Retained rider position during a route ride.
    pub fn controller_location(&self) -> String {
        self.topic("controller/location")
    }

    pub fn kettler_data(&self) -> String {
        self.topic("kettler/data")
    }

    pub fn topic(&self, suffix: &str) -> String {
        format!("{}/{}", self.base, suffix)
    }
}

/// MQTT filter matching: `+` matches one level, a trailing `#` the rest.
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let mut pat = pattern.split('/');
    let mut top = topic.split('/');
    loop {
        match (pat.next(), top.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(p), Some(t)) if p == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
