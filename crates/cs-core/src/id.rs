use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner shared by every id kind.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Declares a lightweight interned identifier.
/// Internally a `Spur` index: 4 bytes, `Copy`, O(1) equality and hashing.
macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $sigil:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing handle.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($sigil, "{}"), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identity of an interactive shape. Must stay stable across rebuilds
    /// that represent the same pickable target.
    ShapeId,
    "#"
);

interned_id!(
    /// Opaque token naming a gesture owned by the planning authority.
    GestureId,
    "g:"
);

interned_id!(
    /// Opaque token naming a planning project.
    ProjectId,
    "p:"
);

impl GestureId {
    /// Mint a fresh random gesture id.
    pub fn generate() -> Self {
        Self::intern(&uuid::Uuid::new_v4().to_string())
    }
}

impl ProjectId {
    /// Mint a fresh random project id.
    pub fn generate() -> Self {
        Self::intern(&uuid::Uuid::new_v4().to_string())
    }
}

impl ShapeId {
    /// Id for a shape derived from a gesture plus a role suffix,
    /// e.g. `3f2a…:insert`.
    pub fn for_gesture(gesture: GestureId, role: &str) -> Self {
        Self::intern(&format!("{}:{role}", gesture.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ShapeId::intern("planning-canvas");
        let b = ShapeId::intern("planning-canvas");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "planning-canvas");
    }

    #[test]
    fn generated_gesture_ids_are_unique() {
        let a = GestureId::generate();
        let b = GestureId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn shape_ids_derived_from_gesture_are_stable() {
        let gesture = GestureId::intern("road-7");
        assert_eq!(
            ShapeId::for_gesture(gesture, "split"),
            ShapeId::for_gesture(gesture, "split")
        );
        assert_eq!(ShapeId::for_gesture(gesture, "split").as_str(), "road-7:split");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ProjectId::intern("proj-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"proj-1\"");
        let back: ProjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
