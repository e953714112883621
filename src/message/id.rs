use std::fmt;

use serde_json::Value;

/// A QQ number, group number or message id.
///
/// Upstream ids arrive as either signed or unsigned 64-bit integers, so an
/// `Id` holds any value in `i64::MIN..=u64::MAX` and writes it back as the
/// same JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(i128);

impl Id {
    pub const MIN: Id = Id(i64::MIN as i128);
    pub const MAX: Id = Id(u64::MAX as i128);

    /// `None` outside `i64::MIN..=u64::MAX`.
    pub fn new(raw: i128) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0).contains(&raw).then_some(Self(raw))
    }

    pub fn get(self) -> i128 {
        self.0
    }

    pub fn as_i64(self) -> Option<i64> {
        i64::try_from(self.0).ok()
    }

    pub fn as_u64(self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }
}

macro_rules! id_from {
    ($($int:ty),+) => {
        $(
            impl From<$int> for Id {
                fn from(value: $int) -> Self {
                    Self(i128::from(value))
                }
            }
        )+
    };
}

id_from!(i32, u32, i64, u64);

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        match id.as_u64() {
            Some(unsigned) => Value::from(unsigned),
            // Negative ids always fit in i64.
            None => Value::from(id.0 as i64),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
