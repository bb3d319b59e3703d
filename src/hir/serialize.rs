/*!
Serialization of a [`Hir`] into a self-describing tree.

Every node becomes a map carrying `"@name"` (the qualified type name),
`"@type"` (`"struct"` or `"enum"`) and, for enums, `"@variant"`. Named
fields are written as map entries and tuple payloads as a `"@values"`
sequence. This lets tooling walk the tree without knowing the layout of
these types.
*/

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::hir::{
    Capture, Class, ClassBytes, ClassBytesRange, ClassUnicode,
    ClassUnicodeRange, Hir, HirKind, Literal, Look, Repetition,
};

macro_rules! name {
    ($ty:ident) => {
        concat!("rregex::hir::", stringify!($ty))
    };
}

/// Starts a node map with its tag entries already written.
fn node<S: Serializer>(
    serializer: S,
    name: &'static str,
    variant: Option<&'static str>,
) -> Result<S::SerializeMap, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("@name", name)?;
    match variant {
        None => map.serialize_entry("@type", "struct")?,
        Some(variant) => {
            map.serialize_entry("@type", "enum")?;
            map.serialize_entry("@variant", variant)?;
        }
    }
    Ok(map)
}

/// A tuple payload of exactly one value.
struct One<'a, T: ?Sized>(&'a T);

impl<'a, T: Serialize + ?Sized> Serialize for One<'a, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(self.0)?;
        seq.end()
    }
}

struct Bytes<'a>(&'a [u8]);

impl<'a> Serialize for Bytes<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

impl Serialize for Hir {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = node(serializer, name!(Hir), None)?;
        map.serialize_entry("kind", self.kind())?;
        map.end()
    }
}

impl Serialize for HirKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let variant = match *self {
            HirKind::Empty => "Empty",
            HirKind::Literal(_) => "Literal",
            HirKind::Class(_) => "Class",
            HirKind::Look(_) => "Look",
            HirKind::Repetition(_) => "Repetition",
            HirKind::Capture(_) => "Capture",
            HirKind::Concat(_) => "Concat",
            HirKind::Alternation(_) => "Alternation",
        };
        let mut map = node(serializer, name!(HirKind), Some(variant))?;
        match *self {
            HirKind::Empty => {}
            HirKind::Literal(ref x) => map.serialize_entry("@values", &One(x))?,
            HirKind::Class(ref x) => map.serialize_entry("@values", &One(x))?,
            HirKind::Look(ref x) => map.serialize_entry("@values", &One(x))?,
            HirKind::Repetition(ref x) => {
                map.serialize_entry("@values", &One(x))?
            }
            HirKind::Capture(ref x) => map.serialize_entry("@values", &One(x))?,
            HirKind::Concat(ref x) | HirKind::Alternation(ref x) => {
                map.serialize_entry("@values", &One(x))?
            }
        }
        map.end()
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = node(serializer, name!(Literal), None)?;
        map.serialize_entry("@values", &One(&Bytes(&self.0)))?;
        map.end()
    }
}

impl Serialize for Class {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Class::Unicode(ref x) => {
                let mut map = node(serializer, name!(Class), Some("Unicode"))?;
                map.serialize_entry("@values", &One(x))?;
                map.end()
            }
            Class::Bytes(ref x) => {
                let mut map = node(serializer, name!(Class), Some("Bytes"))?;
                map.serialize_entry("@values", &One(x))?;
                map.end()
            }
        }
    }
}

impl Serialize for ClassUnicode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = node(serializer, name!(ClassUnicode), None)?;
        map.serialize_entry("ranges", self.ranges())?;
        map.end()
    }
}

impl Serialize for ClassUnicodeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = node(serializer, name!(ClassUnicodeRange), None)?;
        map.serialize_entry("start", &self.start())?;
        map.serialize_entry("end", &self.end())?;
        map.serialize_entry("len", &self.len())?;
        map.end()
    }
}

impl Serialize for ClassBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = node(serializer, name!(ClassBytes), None)?;
        map.serialize_entry("ranges", self.ranges())?;
        map.end()
    }
}

impl Serialize for ClassBytesRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = node(serializer, name!(ClassBytesRange), None)?;
        map.serialize_entry("start", &self.start())?;
        map.serialize_entry("end", &self.end())?;
        map.serialize_entry("len", &self.len())?;
        map.end()
    }
}

impl Serialize for Look {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        node(serializer, name!(Look), Some(self.as_str()))?.end()
    }
}

impl Serialize for Repetition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = node(serializer, name!(Repetition), None)?;
        map.serialize_entry("min", &self.min)?;
        map.serialize_entry("max", &self.max)?;
        map.serialize_entry("greedy", &self.greedy)?;
        map.serialize_entry("sub", &*self.sub)?;
        map.end()
    }
}

impl Serialize for Capture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = node(serializer, name!(Capture), None)?;
        map.serialize_entry("index", &self.index)?;
        map.serialize_entry("name", &self.name.as_deref())?;
        map.serialize_entry("sub", &*self.sub)?;
        map.end()
    }
}
