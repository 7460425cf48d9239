//! Ordered header fields with ASCII case-insensitive names.

use std::fmt;

/// One `name: value` line as it appeared on the wire or was added by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    value: String,
}

impl Field {
    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The header section of a request or response.
///
/// Field order is kept and a name may repeat. Lookups ignore ASCII case, so
/// `Location`, `location` and `LOCATION` are the same field. Headers the
/// router writes itself (`Allow`, `Location`) go through [`Headers::set`] so
/// they appear exactly once.
///
/// # Examples
///
/// ```
/// use radixroute::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("Vary", "Accept");
/// headers.insert("vary", "Origin");
/// headers.set("Allow", "GET, OPTIONS");
///
/// assert_eq!(headers.get("ALLOW"), Some("GET, OPTIONS"));
/// assert_eq!(headers.get_all("Vary").collect::<Vec<_>>(), ["Accept", "Origin"]);
/// assert_eq!(headers.to_string(), "Vary: Accept\r\nvary: Origin\r\nAllow: GET, OPTIONS\r\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Headers {
    fields: Vec<Field>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a field, keeping any earlier ones with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Makes `value` the only value of `name`.
    ///
    /// The field keeps the position of its first occurrence; a new name is
    /// appended.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.fields.iter().position(|field| field.is(&name)) {
            Some(first) => {
                self.fields[first].value = value;
                let mut index = 0;
                self.fields.retain(|field| {
                    let keep = index <= first || !field.is(&name);
                    index += 1;
                    keep
                });
            }
            None => self.fields.push(Field { name, value }),
        }
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.is(name))
            .map(|field| field.value.as_str())
    }

    /// Every value of `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.is(name))
            .map(|field| field.value.as_str())
    }

    /// Drops every field called `name`, returning whether any existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|field| !field.is(name));
        self.fields.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.is(name))
    }

    /// Number of fields, counting repeated names separately.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.name.as_str(), field.value.as_str()))
    }
}

/// Writes the fields in wire format, each terminated by CRLF.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iter()
            .try_for_each(|(name, value)| write!(f, "{name}: {value}\r\n"))
    }
}
