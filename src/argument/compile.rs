//! Pure argument-to-token compilation.

use super::value::{Arg, ArgStyle, ArgValue};
use crate::error::{ProcshError, Result};
use std::borrow::Cow;

/// Canonical spelling of an option name.
///
/// Underscores become hyphens for long names only, so `almost_all` and
/// `almost-all` name the same option while `_` stays a valid short name.
pub fn option_name(name: &str) -> Cow<'_, str> {
    if name.chars().count() > 1 && name.contains('_') {
        Cow::Owned(name.replace('_', "-"))
    } else {
        Cow::Borrowed(name)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ProcshError::InvalidArgument(
            "option name must not be empty".to_string(),
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ProcshError::InvalidArgument(format!(
            "option name `{}' must not contain whitespace",
            name
        )));
    }
    Ok(())
}

/// Compile one named option into zero, one or two tokens.
pub fn compile_option(name: &str, value: &ArgValue, style: &ArgStyle) -> Result<Vec<String>> {
    validate_name(name)?;

    let resolved;
    let value = match value {
        ArgValue::Lazy(lazy) => {
            resolved = lazy.resolve();
            &resolved
        }
        other => other,
    };

    let text = match value {
        ArgValue::Absent | ArgValue::Bool(false) => return Ok(Vec::new()),
        ArgValue::Bool(true) => None,
        ArgValue::Text(text) => Some(text.as_str()),
        ArgValue::Lazy(_) => {
            return Err(ProcshError::InvalidArgument(format!(
                "lazy value for option `{}' resolved to another lazy value",
                name
            )));
        }
    };

    let name = option_name(name);
    if name.chars().count() == 1 {
        return Ok(match text {
            None => vec![format!("-{}", name)],
            Some(text) => vec![format!("-{}{}", name, text)],
        });
    }

    let flag = format!("{}{}", style.long_prefix, name);
    Ok(match (text, &style.long_separator) {
        (None, _) => vec![flag],
        (Some(text), None) => vec![flag, text.to_string()],
        (Some(text), Some(sep)) => vec![format!("{}{}{}", flag, sep, text)],
    })
}

/// Compile a single argument.
pub fn compile_arg(arg: &Arg, style: &ArgStyle) -> Result<Vec<String>> {
    match arg {
        Arg::Positional(value) => Ok(vec![value.clone()]),
        Arg::Named(name, value) => compile_option(name, value, style),
    }
}

/// Collapse repeated named options.
///
/// The first occurrence keeps its position, the last occurrence provides the
/// value. Positional arguments are never merged.
pub fn merge_args<I>(args: I) -> Vec<Arg>
where
    I: IntoIterator<Item = Arg>,
{
    let mut merged: Vec<Arg> = Vec::new();
    for arg in args {
        match arg {
            Arg::Named(name, value) => {
                let key = option_name(&name).into_owned();
                let existing = merged.iter_mut().find_map(|slot| match slot {
                    Arg::Named(existing, slot_value) if option_name(existing) == key => {
                        Some(slot_value)
                    }
                    _ => None,
                });
                match existing {
                    Some(slot_value) => *slot_value = value,
                    None => merged.push(Arg::Named(name, value)),
                }
            }
            positional => merged.push(positional),
        }
    }
    merged
}

/// Merge and compile an argument list into a flat token sequence.
pub fn compile_args<I>(args: I, style: &ArgStyle) -> Result<Vec<String>>
where
    I: IntoIterator<Item = Arg>,
{
    let mut tokens = Vec::new();
    for arg in merge_args(args) {
        tokens.extend(compile_arg(&arg, style)?);
    }
    Ok(tokens)
}
