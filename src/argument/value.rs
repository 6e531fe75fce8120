//! Argument value types.

use std::fmt;
use std::sync::Arc;

/// A value resolved only when the argument list is compiled.
#[derive(Clone)]
pub struct LazyValue(Arc<dyn Fn() -> ArgValue + Send + Sync>);

impl LazyValue {
    pub(crate) fn resolve(&self) -> ArgValue {
        (self.0)()
    }
}

impl fmt::Debug for LazyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyValue(..)")
    }
}

/// Value carried by a named argument.
#[derive(Debug, Clone, Default)]
pub enum ArgValue {
    /// No value: the option is omitted.
    #[default]
    Absent,
    /// `true` emits a bare flag, `false` omits the option.
    Bool(bool),
    /// Emitted as the option's value.
    Text(String),
    /// Deferred value, resolved exactly once per compilation.
    Lazy(LazyValue),
}

impl ArgValue {
    /// Wrap a closure whose result is computed at compile time.
    pub fn lazy<F, V>(f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<ArgValue>,
    {
        ArgValue::Lazy(LazyValue(Arc::new(move || f().into())))
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

macro_rules! text_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ArgValue {
                fn from(value: $ty) -> Self {
                    ArgValue::Text(value.to_string())
                }
            }
        )*
    };
}

text_from_display!(i32, i64, u32, u64, usize, f64);

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ArgValue::Absent, Into::into)
    }
}

/// One call-site argument.
#[derive(Debug, Clone)]
pub enum Arg {
    /// Passed through verbatim.
    Positional(String),
    /// Option name (without prefix) and its value.
    Named(String, ArgValue),
}

impl Arg {
    pub fn positional(value: impl Into<String>) -> Self {
        Arg::Positional(value.into())
    }

    pub fn named(name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        Arg::Named(name.into(), value.into())
    }

    /// Shorthand for `Arg::named(name, true)`.
    pub fn flag(name: impl Into<String>) -> Self {
        Arg::Named(name.into(), ArgValue::Bool(true))
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Positional(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Positional(value)
    }
}

/// How long options are spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgStyle {
    /// Joins a long option and its value; `None` emits two tokens.
    pub long_separator: Option<String>,
    /// Prefix of long options.
    pub long_prefix: String,
}

impl Default for ArgStyle {
    fn default() -> Self {
        Self {
            long_separator: Some("=".to_string()),
            long_prefix: "--".to_string(),
        }
    }
}
