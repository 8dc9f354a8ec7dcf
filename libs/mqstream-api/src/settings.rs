/// Read-only custom settings scoped to one configured route.
///
/// Built by the engine from the route configuration and handed to the
/// transformer through its inputs. Values are strings; the typed getters
/// parse on read and return `None` when the key is absent or the value
/// does not parse.
#[derive(Debug, Clone, Default)]
pub struct CustomSettings {
    entries: Vec<(String, String)>,
}

impl CustomSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.parse().ok()
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.parse().ok()
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name)?.parse().ok()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CustomSettings {
        CustomSettings::from_entries([
            ("region".to_owned(), "eu-west-1".to_owned()),
            ("batch".to_owned(), "25".to_owned()),
            ("dry-run".to_owned(), "true".to_owned()),
        ])
    }

    #[test]
    fn test_get() {
        let s = settings();
        assert_eq!(s.get("region"), Some("eu-west-1"));
        assert_eq!(s.get("missing"), None);
    }

    #[test]
    fn test_typed_getters() {
        let s = settings();
        assert_eq!(s.get_i64("batch"), Some(25));
        assert_eq!(s.get_bool("dry-run"), Some(true));
        // Present but unparseable.
        assert_eq!(s.get_i64("region"), None);
    }

    #[test]
    fn test_keys_preserve_order() {
        let s = settings();
        let keys: Vec<_> = s.keys().collect();
        assert_eq!(keys, ["region", "batch", "dry-run"]);
    }
}
