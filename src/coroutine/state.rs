//! Typed state shared between a host and a running script
//!
//! A coroutine's state value is plain Rust data. The script sees it as its
//! single argument: `state.pos.y -= 1` becomes `set_field(["pos", "y"], ..)`
//! on the host value, so the host reads the result directly after each step.
//!
//! Structs opt in with [`script_state!`](crate::script_state):
//!
//! ```
//! use tickflow::coroutine::Vec2;
//! use tickflow::script_state;
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct Ball {
//!     pub pos: Vec2,
//!     pub bounces: i32,
//! }
//!
//! script_state!(Ball as "Ball" { pos, bounces });
//! ```

use crate::executor::Val;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to read or write a state field from a script
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{type_name} has no field '{field}'")]
    NoSuchField {
        type_name: &'static str,
        field: String,
    },

    #[error("field '{path}' expects {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl FieldError {
    /// Prefix the error's path with the field it was reached through
    pub fn within(self, segment: &str) -> Self {
        match self {
            FieldError::TypeMismatch {
                path,
                expected,
                found,
            } => FieldError::TypeMismatch {
                path: if path.is_empty() {
                    segment.to_string()
                } else {
                    format!("{}.{}", segment, path)
                },
                expected,
                found,
            },
            other => other,
        }
    }

    fn mismatch(expected: &'static str, found: &Val) -> Self {
        FieldError::TypeMismatch {
            path: String::new(),
            expected,
            found: found.type_name(),
        }
    }
}

/// A coroutine argument: the state value a script mutates while suspended
pub trait ScriptState {
    /// Script-visible type name, checked against a parameter's declared type
    fn type_name(&self) -> &'static str;

    /// Read the field at `path` (`["pos", "x"]`)
    fn get_field(&self, path: &[&str]) -> Option<Val>;

    /// Write the field at `path`
    fn set_field(&mut self, path: &[&str], value: Val) -> Result<(), FieldError>;
}

/// Anything that can sit in a state field: leaves (numbers, bools, strings)
/// and nested structs declared with `script_state!`.
pub trait FieldValue {
    /// The whole value as a script value
    fn to_val(&self) -> Val;

    /// Read below this value; leaves only answer the empty path
    fn get_path(&self, path: &[&str]) -> Option<Val> {
        if path.is_empty() {
            Some(self.to_val())
        } else {
            None
        }
    }

    /// Report whether `set_path(path, value)` would succeed, without writing
    fn check_path(&self, path: &[&str], value: &Val) -> Result<(), FieldError>;

    /// Write below this value; the empty path replaces it
    fn set_path(&mut self, path: &[&str], value: Val) -> Result<(), FieldError>;
}

/// Leaves have no fields below them
fn leaf_path(path: &[&str]) -> Result<(), FieldError> {
    match path.first() {
        None => Ok(()),
        Some(field) => Err(FieldError::NoSuchField {
            type_name: "a scalar",
            field: field.to_string(),
        }),
    }
}

impl FieldValue for f64 {
    fn to_val(&self) -> Val {
        Val::Num(*self)
    }

    fn check_path(&self, path: &[&str], value: &Val) -> Result<(), FieldError> {
        let mut scratch = *self;
        scratch.set_path(path, value.clone())
    }

    fn set_path(&mut self, path: &[&str], value: Val) -> Result<(), FieldError> {
        leaf_path(path)?;
        match value {
            Val::Num(n) => {
                *self = n;
                Ok(())
            }
            other => Err(FieldError::mismatch("number", &other)),
        }
    }
}

impl FieldValue for f32 {
    fn to_val(&self) -> Val {
        Val::Num(f64::from(*self))
    }

    fn check_path(&self, path: &[&str], value: &Val) -> Result<(), FieldError> {
        let mut scratch = *self;
        scratch.set_path(path, value.clone())
    }

    fn set_path(&mut self, path: &[&str], value: Val) -> Result<(), FieldError> {
        leaf_path(path)?;
        match value {
            Val::Num(n) => {
                *self = n as f32;
                Ok(())
            }
            other => Err(FieldError::mismatch("number", &other)),
        }
    }
}

macro_rules! integer_field {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            fn to_val(&self) -> Val {
                Val::Num(*self as f64)
            }

            fn check_path(&self, path: &[&str], value: &Val) -> Result<(), FieldError> {
                let mut scratch = *self;
                scratch.set_path(path, value.clone())
            }

            fn set_path(&mut self, path: &[&str], value: Val) -> Result<(), FieldError> {
                leaf_path(path)?;
                match value {
                    Val::Num(n) if n.fract() == 0.0 && n >= <$ty>::MIN as f64 && n <= <$ty>::MAX as f64 => {
                        *self = n as $ty;
                        Ok(())
                    }
                    other => Err(FieldError::mismatch("integer", &other)),
                }
            }
        }
    )*};
}

integer_field!(i32, i64, u32);

impl FieldValue for bool {
    fn to_val(&self) -> Val {
        Val::Bool(*self)
    }

    fn check_path(&self, path: &[&str], value: &Val) -> Result<(), FieldError> {
        let mut scratch = *self;
        scratch.set_path(path, value.clone())
    }

    fn set_path(&mut self, path: &[&str], value: Val) -> Result<(), FieldError> {
        leaf_path(path)?;
        match value {
            Val::Bool(b) => {
                *self = b;
                Ok(())
            }
            other => Err(FieldError::mismatch("bool", &other)),
        }
    }
}

impl FieldValue for String {
    fn to_val(&self) -> Val {
        Val::Str(self.clone())
    }

    fn check_path(&self, path: &[&str], value: &Val) -> Result<(), FieldError> {
        String::new().set_path(path, value.clone())
    }

    fn set_path(&mut self, path: &[&str], value: Val) -> Result<(), FieldError> {
        leaf_path(path)?;
        match value {
            Val::Str(s) => {
                *self = s;
                Ok(())
            }
            other => Err(FieldError::mismatch("string", &other)),
        }
    }
}

/// Expose a struct's fields to scripts
///
/// `script_state!(Type as "ScriptName" { field, ... })` implements both
/// [`ScriptState`] and [`FieldValue`], so the type can be a coroutine state
/// and also nest inside other states. Every listed field must itself
/// implement `FieldValue`.
#[macro_export]
macro_rules! script_state {
    ($ty:ty as $name:literal { $($field:ident),* $(,)? }) => {
        impl $crate::coroutine::FieldValue for $ty {
            fn to_val(&self) -> $crate::executor::Val {
                let mut map = ::std::collections::HashMap::new();
                $(
                    map.insert(
                        stringify!($field).to_string(),
                        $crate::coroutine::FieldValue::to_val(&self.$field),
                    );
                )*
                $crate::executor::Val::Obj(map)
            }

            fn get_path(&self, path: &[&str]) -> Option<$crate::executor::Val> {
                let Some((first, rest)) = path.split_first() else {
                    return Some($crate::coroutine::FieldValue::to_val(self));
                };
                $(
                    if *first == stringify!($field) {
                        return $crate::coroutine::FieldValue::get_path(&self.$field, rest);
                    }
                )*
                None
            }

            fn check_path(
                &self,
                path: &[&str],
                value: &$crate::executor::Val,
            ) -> Result<(), $crate::coroutine::FieldError> {
                let Some((first, rest)) = path.split_first() else {
                    return match value {
                        $crate::executor::Val::Obj(map) => {
                            // Sorted so the reported error does not depend on map order
                            let mut keys: Vec<&String> = map.keys().collect();
                            keys.sort();
                            for key in keys {
                                $crate::coroutine::FieldValue::check_path(
                                    self,
                                    &[key.as_str()],
                                    &map[key],
                                )?;
                            }
                            Ok(())
                        }
                        other => Err($crate::coroutine::FieldError::TypeMismatch {
                            path: String::new(),
                            expected: $name,
                            found: other.type_name(),
                        }),
                    };
                };
                $(
                    if *first == stringify!($field) {
                        return $crate::coroutine::FieldValue::check_path(&self.$field, rest, value)
                            .map_err(|e| e.within(first));
                    }
                )*
                Err($crate::coroutine::FieldError::NoSuchField {
                    type_name: $name,
                    field: first.to_string(),
                })
            }

            fn set_path(
                &mut self,
                path: &[&str],
                value: $crate::executor::Val,
            ) -> Result<(), $crate::coroutine::FieldError> {
                let Some((first, rest)) = path.split_first() else {
                    // Whole-struct assignment: all fields are checked before any is written
                    $crate::coroutine::FieldValue::check_path(self, &[], &value)?;
                    if let $crate::executor::Val::Obj(map) = value {
                        for (key, v) in map {
                            $crate::coroutine::FieldValue::set_path(self, &[key.as_str()], v)?;
                        }
                    }
                    return Ok(());
                };
                $(
                    if *first == stringify!($field) {
                        return $crate::coroutine::FieldValue::set_path(&mut self.$field, rest, value)
                            .map_err(|e| e.within(first));
                    }
                )*
                Err($crate::coroutine::FieldError::NoSuchField {
                    type_name: $name,
                    field: first.to_string(),
                })
            }
        }

        impl $crate::coroutine::ScriptState for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn get_field(&self, path: &[&str]) -> Option<$crate::executor::Val> {
                $crate::coroutine::FieldValue::get_path(self, path)
            }

            fn set_field(
                &mut self,
                path: &[&str],
                value: $crate::executor::Val,
            ) -> Result<(), $crate::coroutine::FieldError> {
                $crate::coroutine::FieldValue::set_path(self, path, value)
            }
        }
    };
}

/// 2D vector, the usual position type in script states
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

script_state!(Vec2 as "Vec2" { x, y });

/// State for coroutines that carry nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoState;

impl ScriptState for NoState {
    fn type_name(&self) -> &'static str {
        "NoState"
    }

    fn get_field(&self, _path: &[&str]) -> Option<Val> {
        None
    }

    fn set_field(&mut self, path: &[&str], _value: Val) -> Result<(), FieldError> {
        Err(FieldError::NoSuchField {
            type_name: "NoState",
            field: path.join("."),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Cat {
        pos: Vec2,
        lives: i32,
        name: String,
        asleep: bool,
    }

    script_state!(Cat as "Cat" { pos, lives, name, asleep });

    #[test]
    fn test_type_name() {
        assert_eq!(Cat::default().type_name(), "Cat");
        assert_eq!(Vec2::default().type_name(), "Vec2");
    }

    #[test]
    fn test_get_nested_and_leaf_fields() {
        let cat = Cat {
            pos: Vec2::new(1.5, -2.0),
            lives: 9,
            ..Cat::default()
        };

        assert_eq!(cat.get_field(&["pos", "x"]), Some(Val::Num(1.5)));
        assert_eq!(cat.get_field(&["lives"]), Some(Val::Num(9.0)));
        assert_eq!(cat.get_field(&["asleep"]), Some(Val::Bool(false)));
        assert_eq!(cat.get_field(&["tail"]), None);
        assert_eq!(cat.get_field(&["lives", "x"]), None);

        let Some(Val::Obj(pos)) = cat.get_field(&["pos"]) else {
            panic!("pos should read as an object");
        };
        assert_eq!(pos["y"], Val::Num(-2.0));
    }

    #[test]
    fn test_set_fields() {
        let mut cat = Cat::default();

        cat.set_field(&["pos", "y"], Val::Num(40.0)).unwrap();
        cat.set_field(&["lives"], Val::Num(3.0)).unwrap();
        cat.set_field(&["name"], Val::from("tom")).unwrap();
        cat.set_field(&["asleep"], Val::Bool(true)).unwrap();

        assert_eq!(
            cat,
            Cat {
                pos: Vec2::new(0.0, 40.0),
                lives: 3,
                name: "tom".to_string(),
                asleep: true,
            }
        );
    }

    #[test]
    fn test_set_whole_struct_from_object() {
        let mut cat = Cat::default();
        let mut obj = std::collections::HashMap::new();
        obj.insert("x".to_string(), Val::Num(7.0));
        obj.insert("y".to_string(), Val::Num(8.0));

        cat.set_field(&["pos"], Val::Obj(obj)).unwrap();

        assert_eq!(cat.pos, Vec2::new(7.0, 8.0));
    }

    #[test]
    fn test_set_errors() {
        let mut cat = Cat::default();

        assert_eq!(
            cat.set_field(&["tail"], Val::Num(1.0)),
            Err(FieldError::NoSuchField {
                type_name: "Cat",
                field: "tail".to_string()
            })
        );

        let err = cat.set_field(&["pos", "x"], Val::from("left")).unwrap_err();
        assert_eq!(err.to_string(), "field 'pos.x' expects number, got string");

        // Integers refuse fractions
        let err = cat.set_field(&["lives"], Val::Num(2.5)).unwrap_err();
        assert!(matches!(err, FieldError::TypeMismatch { expected: "integer", .. }));

        assert!(cat.set_field(&["pos"], Val::Num(1.0)).is_err());
        assert_eq!(cat, Cat::default());
    }

    #[test]
    fn test_failed_whole_struct_write_changes_nothing() {
        let original = Cat {
            pos: Vec2::new(1.0, 2.0),
            lives: 9,
            name: "tom".to_string(),
            asleep: false,
        };
        let mut cat = original.clone();

        // Valid fields alongside one unknown field
        let mut obj = std::collections::HashMap::new();
        obj.insert("lives".to_string(), Val::Num(3.0));
        obj.insert("name".to_string(), Val::from("felix"));
        obj.insert("tail".to_string(), Val::Num(1.0));
        let err = cat.set_field(&[], Val::Obj(obj)).unwrap_err();
        assert_eq!(
            err,
            FieldError::NoSuchField {
                type_name: "Cat",
                field: "tail".to_string()
            }
        );
        assert_eq!(cat, original);

        // Valid fields alongside one badly typed nested field
        let mut pos = std::collections::HashMap::new();
        pos.insert("x".to_string(), Val::Num(5.0));
        pos.insert("y".to_string(), Val::Bool(true));
        let mut obj = std::collections::HashMap::new();
        obj.insert("asleep".to_string(), Val::Bool(true));
        obj.insert("pos".to_string(), Val::Obj(pos));
        let err = cat.set_field(&[], Val::Obj(obj)).unwrap_err();
        assert_eq!(err.to_string(), "field 'pos.y' expects number, got bool");
        assert_eq!(cat, original);
    }

    #[test]
    fn test_check_path_does_not_write() {
        let cat = Cat::default();

        assert!(cat.check_path(&["lives"], &Val::Num(4.0)).is_ok());
        assert!(cat.check_path(&["lives"], &Val::Num(4.5)).is_err());
        assert!(cat.check_path(&["pos", "z"], &Val::Num(0.0)).is_err());
        assert_eq!(cat, Cat::default());
    }

    #[test]
    fn test_no_state() {
        let mut s = NoState;
        assert_eq!(s.get_field(&["x"]), None);
        assert!(s.set_field(&["x"], Val::Null).is_err());
    }
}
