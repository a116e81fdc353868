use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use typed_builder::TypedBuilder;

use crate::error::CoreError;

/// Network-level identifier of a mote. Unique within one simulation and stable for the whole run.
#[derive(Deserialize, Serialize, Default, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct MoteId(u32);

impl fmt::Display for MoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for MoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MoteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().parse::<u32>()?;
        Ok(Self(id))
    }
}

impl From<u32> for MoteId {
    fn from(f: u32) -> Self {
        Self(f)
    }
}

/// Address of a mote as written by the predicate checker, e.g. `"3.0"`. The leading component
/// is the network mote id, anything after the separator is a sub-address that has no meaning
/// for slot checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompositeId {
    mote: MoteId,
    sub_address: Option<u32>,
}

impl CompositeId {
    pub fn new(mote: MoteId, sub_address: Option<u32>) -> Self {
        Self { mote, sub_address }
    }

    pub fn mote(&self) -> MoteId {
        self.mote
    }

    pub fn sub_address(&self) -> Option<u32> {
        self.sub_address
    }
}

impl From<MoteId> for CompositeId {
    fn from(mote: MoteId) -> Self {
        Self::new(mote, None)
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_address {
            Some(sub) => write!(f, "{}.{}", self.mote, sub),
            None => write!(f, "{}", self.mote),
        }
    }
}

impl FromStr for CompositeId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidAddress(s.to_string());
        let mut parts = s.trim().splitn(2, '.');
        let mote = parts
            .next()
            .ok_or_else(invalid)?
            .parse::<MoteId>()
            .map_err(|_| invalid())?;
        let sub_address = match parts.next() {
            Some(rest) => Some(rest.parse::<u32>().map_err(|_| invalid())?),
            None => None,
        };
        Ok(Self::new(mote, sub_address))
    }
}

struct CompositeIdVisitor;

impl Visitor<'_> for CompositeIdVisitor {
    type Value = CompositeId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mote id or an address string such as \"3.0\"")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        let id = u32::try_from(value).map_err(E::custom)?;
        Ok(CompositeId::from(MoteId::from(id)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        let id = u32::try_from(value).map_err(E::custom)?;
        Ok(CompositeId::from(MoteId::from(id)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse::<CompositeId>().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for CompositeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CompositeIdVisitor)
    }
}

/// Static position of a mote in the simulated field.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, TypedBuilder)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_with_sub_address() {
        let address = "3.0".parse::<CompositeId>().unwrap();
        assert_eq!(address.mote(), MoteId::from(3));
        assert_eq!(address.sub_address(), Some(0));
        assert_eq!(address.to_string(), "3.0");
    }

    #[test]
    fn composite_without_sub_address() {
        let address = "12".parse::<CompositeId>().unwrap();
        assert_eq!(address.mote(), MoteId::from(12));
        assert_eq!(address.sub_address(), None);
    }

    #[test]
    fn composite_rejects_garbage() {
        assert!("x.0".parse::<CompositeId>().is_err());
        assert!("3.y".parse::<CompositeId>().is_err());
        assert!("".parse::<CompositeId>().is_err());
    }

    #[test]
    fn point_distance() {
        let a = Point2D::builder().x(0.0).y(0.0).build();
        let b = Point2D::builder().x(3.0).y(4.0).build();
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(b.distance_squared(&a), 25.0);
    }
}
