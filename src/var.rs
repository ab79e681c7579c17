//! Dynamic value container.
//!
//! [`Var`] is the payload used where static typing stops: property cells,
//! heterogeneous sequences and observables that carry other observables.
//! Cloning a `Var` never copies strings, arrays or objects; they are shared
//! behind an `Arc`.

use std::{any::Any, fmt, sync::Arc};

use crate::{error::RxError, observable::Observable};

/// Capability required from values stored as [`Var::Object`].
///
/// Implemented for every `Any + Send + Sync + Debug + PartialEq` type, so
/// user code never implements it by hand.
pub trait DynObject: Any + Send + Sync + fmt::Debug {
  fn as_any(&self) -> &dyn Any;

  /// Value equality against another object of any type.
  fn dyn_eq(&self, other: &dyn DynObject) -> bool;

  fn type_name(&self) -> &'static str;
}

impl<T> DynObject for T
where
  T: Any + Send + Sync + fmt::Debug + PartialEq,
{
  fn as_any(&self) -> &dyn Any { self }

  fn dyn_eq(&self, other: &dyn DynObject) -> bool {
    other.as_any().downcast_ref::<T>().is_some_and(|other| self == other)
  }

  fn type_name(&self) -> &'static str { std::any::type_name::<T>() }
}

#[derive(Clone, Debug, Default)]
pub enum Var {
  #[default]
  Undefined,
  Bool(bool),
  Int(i64),
  Double(f64),
  String(Arc<str>),
  Array(Arc<[Var]>),
  Object(Arc<dyn DynObject>),
}

impl Var {
  /// Wraps an arbitrary typed value as an opaque object.
  pub fn object<T>(value: T) -> Self
  where
    T: Any + Send + Sync + fmt::Debug + PartialEq,
  {
    Var::Object(Arc::new(value))
  }

  pub fn array(items: impl IntoIterator<Item = Var>) -> Self {
    Var::Array(items.into_iter().collect())
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Var::Undefined => "undefined",
      Var::Bool(_) => "bool",
      Var::Int(_) => "int",
      Var::Double(_) => "double",
      Var::String(_) => "string",
      Var::Array(_) => "array",
      Var::Object(_) => "object",
    }
  }

  #[inline]
  pub fn is_undefined(&self) -> bool { matches!(self, Var::Undefined) }

  #[inline]
  pub fn is_numeric(&self) -> bool { matches!(self, Var::Int(_) | Var::Double(_)) }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Var::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_array(&self) -> Option<&[Var]> {
    match self {
      Var::Array(items) => Some(items),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match *self {
      Var::Int(i) => Some(i as f64),
      Var::Double(d) => Some(d),
      _ => None,
    }
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    match self {
      Var::Object(obj) => obj.as_any().downcast_ref::<T>(),
      _ => None,
    }
  }

  /// The observable wrapped by this value, if it holds one.
  pub fn as_observable(&self) -> Option<Observable<Var>> {
    self.downcast_ref::<Observable<Var>>().cloned()
  }

  /// Converts to a native type, see [`FromVar`].
  #[inline]
  pub fn get<T: FromVar>(&self) -> Result<T, RxError> { T::from_var(self) }

  fn conversion_error(&self, to: &'static str) -> RxError {
    RxError::Conversion { from: format!("{} ({self})", self.kind()), to }
  }
}

impl PartialEq for Var {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Var::Undefined, Var::Undefined) => true,
      (Var::Bool(a), Var::Bool(b)) => a == b,
      (Var::Int(a), Var::Int(b)) => a == b,
      (Var::Double(a), Var::Double(b)) => a == b,
      (Var::Int(a), Var::Double(b)) | (Var::Double(b), Var::Int(a)) => *a as f64 == *b,
      (Var::String(a), Var::String(b)) => a == b,
      (Var::Array(a), Var::Array(b)) => Arc::ptr_eq(a, b) || a == b,
      (Var::Object(a), Var::Object(b)) => Arc::ptr_eq(a, b) || a.dyn_eq(b.as_ref()),
      _ => false,
    }
  }
}

impl fmt::Display for Var {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Var::Undefined => Ok(()),
      Var::Bool(b) => write!(f, "{b}"),
      Var::Int(i) => write!(f, "{i}"),
      Var::Double(d) => write!(f, "{d}"),
      Var::String(s) => f.write_str(s),
      Var::Array(items) => {
        f.write_str("[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{item}")?;
        }
        f.write_str("]")
      }
      Var::Object(obj) => write!(f, "<{}>", obj.type_name()),
    }
  }
}

macro_rules! impl_from_native {
  ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
    $(
      impl From<$ty> for Var {
        #[inline]
        fn from(v: $ty) -> Self { Var::$variant(v as $target) }
      }
    )*
  };
}

impl_from_native!(
  i8 => Int as i64,
  i16 => Int as i64,
  i32 => Int as i64,
  i64 => Int as i64,
  u8 => Int as i64,
  u16 => Int as i64,
  u32 => Int as i64,
  f32 => Double as f64,
  f64 => Double as f64,
);

impl From<bool> for Var {
  fn from(v: bool) -> Self { Var::Bool(v) }
}

impl From<()> for Var {
  fn from(_: ()) -> Self { Var::Undefined }
}

impl From<&str> for Var {
  fn from(v: &str) -> Self { Var::String(v.into()) }
}

impl From<String> for Var {
  fn from(v: String) -> Self { Var::String(v.into()) }
}

impl From<Arc<str>> for Var {
  fn from(v: Arc<str>) -> Self { Var::String(v) }
}

impl From<Vec<Var>> for Var {
  fn from(v: Vec<Var>) -> Self { Var::Array(v.into()) }
}

impl From<Observable<Var>> for Var {
  fn from(v: Observable<Var>) -> Self { Var::Object(Arc::new(v)) }
}

/// Conversion from a [`Var`] into a native type.
pub trait FromVar: Sized {
  fn from_var(var: &Var) -> Result<Self, RxError>;
}

impl FromVar for Var {
  fn from_var(var: &Var) -> Result<Self, RxError> { Ok(var.clone()) }
}

impl FromVar for bool {
  fn from_var(var: &Var) -> Result<Self, RxError> {
    match *var {
      Var::Bool(b) => Ok(b),
      Var::Int(i) => Ok(i != 0),
      _ => Err(var.conversion_error("bool")),
    }
  }
}

impl FromVar for i64 {
  fn from_var(var: &Var) -> Result<Self, RxError> {
    match *var {
      Var::Int(i) => Ok(i),
      Var::Double(d) if d.fract() == 0.0 => Ok(d as i64),
      Var::Bool(b) => Ok(b as i64),
      _ => Err(var.conversion_error("i64")),
    }
  }
}

impl FromVar for i32 {
  fn from_var(var: &Var) -> Result<Self, RxError> {
    i64::from_var(var)
      .ok()
      .and_then(|i| i32::try_from(i).ok())
      .ok_or_else(|| var.conversion_error("i32"))
  }
}

impl FromVar for f64 {
  fn from_var(var: &Var) -> Result<Self, RxError> {
    var.as_f64().ok_or_else(|| var.conversion_error("f64"))
  }
}

impl FromVar for f32 {
  fn from_var(var: &Var) -> Result<Self, RxError> {
    var.as_f64().map(|d| d as f32).ok_or_else(|| var.conversion_error("f32"))
  }
}

impl FromVar for String {
  fn from_var(var: &Var) -> Result<Self, RxError> {
    match var {
      Var::String(s) => Ok(s.to_string()),
      Var::Object(_) | Var::Array(_) => Err(var.conversion_error("String")),
      other => Ok(other.to_string()),
    }
  }
}

impl FromVar for Vec<Var> {
  fn from_var(var: &Var) -> Result<Self, RxError> {
    var.as_array().map(<[Var]>::to_vec).ok_or_else(|| var.conversion_error("Vec<Var>"))
  }
}

impl FromVar for Observable<Var> {
  fn from_var(var: &Var) -> Result<Self, RxError> {
    var.as_observable().ok_or_else(|| var.conversion_error("Observable<Var>"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, PartialEq)]
  struct Point {
    x: i32,
    y: i32,
  }

  #[rxvar_macro::test]
  fn numeric_equality_across_kinds() {
    assert_eq!(Var::from(7), Var::from(7.0));
    assert_ne!(Var::from(7), Var::from(7.5));
    assert_ne!(Var::from(1), Var::from(true));
    assert_eq!(Var::from("a"), Var::from(String::from("a")));
  }

  #[rxvar_macro::test]
  fn clone_shares_storage() {
    let v = Var::from(vec![Var::from(1), Var::from("two")]);
    let c = v.clone();
    match (&v, &c) {
      (Var::Array(a), Var::Array(b)) => assert!(Arc::ptr_eq(a, b)),
      _ => unreachable!(),
    }
  }

  #[rxvar_macro::test]
  fn objects_compare_by_identity_then_value() {
    let a = Var::object(Point { x: 1, y: 2 });
    let b = Var::object(Point { x: 1, y: 2 });
    let c = Var::object(Point { x: 3, y: 2 });
    assert_eq!(a, a.clone());
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, Var::object(String::from("point")));
    assert_eq!(a.downcast_ref::<Point>().map(|p| p.x), Some(1));
  }

  #[rxvar_macro::test]
  fn native_conversions() {
    assert_eq!(Var::from(3).get::<i32>(), Ok(3));
    assert_eq!(Var::from(3.0).get::<i64>(), Ok(3));
    assert_eq!(Var::from(3).get::<f64>(), Ok(3.0));
    assert_eq!(Var::from(17.5).get::<String>(), Ok("17.5".to_string()));
    assert_eq!(Var::from(true).get::<bool>(), Ok(true));
    assert!(matches!(Var::from("x").get::<i32>(), Err(RxError::Conversion { to: "i32", .. })));
    assert!(Var::from(1.5).get::<i64>().is_err());
  }

  #[rxvar_macro::test]
  fn display() {
    assert_eq!(Var::Undefined.to_string(), "");
    assert_eq!(Var::from(28).to_string(), "28");
    assert_eq!(Var::from(vec![Var::from(1), Var::from("a")]).to_string(), "[1, a]");
  }

  #[rxvar_macro::test]
  fn wraps_observables() {
    let o = Observable::just(Var::from(1));
    let v = Var::from(o.clone());
    assert_eq!(v.as_observable(), Some(o));
    assert_eq!(Var::from(1).as_observable(), None);
    assert!(Var::from(1).get::<Observable<Var>>().is_err());
  }
}
