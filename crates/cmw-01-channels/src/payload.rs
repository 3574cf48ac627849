//! Listener payload shape

use shared_types::Record;

/// What a listener receives: one record, or several.
///
/// A single-record message is always delivered as `One`, mirroring how it is
/// written on the wire as a bare object.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T = Record> {
    One(T),
    Many(Vec<T>),
}

impl<T> Payload<T> {
    /// Collapse a normalized list back to the wire shape.
    #[must_use]
    pub fn from_vec(mut items: Vec<T>) -> Self {
        if items.len() == 1 {
            if let Some(item) = items.pop() {
                return Payload::One(item);
            }
        }
        Payload::Many(items)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Payload::One(item) => vec![item],
            Payload::Many(items) => items,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Payload::One(_) => 1,
            Payload::Many(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let items: &[T] = match self {
            Payload::One(item) => std::slice::from_ref(item),
            Payload::Many(items) => items,
        };
        items.iter()
    }
}
