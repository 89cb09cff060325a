//! Multi-value dictionary for submitted form data.
//!
//! [`QueryDict`] keeps every value submitted for a key in submission order and
//! remembers the order in which keys first appeared, which matters for
//! bracketed form names such as `article[tags][]`.

use std::collections::HashMap;

/// A read-only dictionary of query string or form-encoded body parameters.
///
/// # Examples
///
/// ```
/// use formflow_http::QueryDict;
///
/// let qd = QueryDict::parse("color=red&color=blue&size=large");
/// assert_eq!(qd.get("color"), Some("blue"));
/// assert_eq!(qd.get_list("color"), Some(&["red".to_string(), "blue".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    values: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl QueryDict {
    /// Creates a new, empty `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL-encoded string (e.g. `"key1=val1&key2=val2"`).
    ///
    /// Handles percent-encoding, `+` as space, and repeated keys.
    pub fn parse(query_string: &str) -> Self {
        let mut qd = Self::new();

        for pair in query_string.split('&') {
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair
                .find('=')
                .map_or((pair, ""), |eq_pos| (&pair[..eq_pos], &pair[eq_pos + 1..]));

            qd.push(percent_decode(key), percent_decode(value));
        }

        qd
    }

    /// Builds a `QueryDict` from already-decoded key/value pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut qd = Self::new();
        for (k, v) in pairs {
            qd.push(k.into(), v.into());
        }
        qd
    }

    fn push(&mut self, key: String, value: String) {
        if !self.values.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.values.entry(key).or_default().push(value);
    }

    /// Returns the last value for the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.last())
            .map(String::as_str)
    }

    /// Returns all values for the given key.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns `true` if any key equals `prefix` or starts with `prefix[`.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.order.iter().any(|k| {
            k == prefix
                || k.strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('['))
        })
    }

    /// Returns the keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}
