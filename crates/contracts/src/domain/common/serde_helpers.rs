use serde::{Deserialize, Deserializer};

/// Deserialize a present field into `Some`, so that `Option<Option<T>>`
/// distinguishes an omitted field (`None`) from an explicit `null`
/// (`Some(None)`).
///
/// Use together with `#[serde(default)]`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        icon: Option<Option<String>>,
    }

    #[test]
    fn test_omitted_null_and_value_are_distinct() {
        let omitted: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(omitted.icon, None);

        let cleared: Patch = serde_json::from_str(r#"{"icon": null}"#).unwrap();
        assert_eq!(cleared.icon, Some(None));

        let set: Patch = serde_json::from_str(r#"{"icon": "/a.png"}"#).unwrap();
        assert_eq!(set.icon, Some(Some("/a.png".to_string())));
    }
}
