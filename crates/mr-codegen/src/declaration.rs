//! Parsing of the declaration line that follows an attribute marker.
//!
//! A declaration has the shape `private <type> <name>;` with anything after
//! the first `;` ignored (trailing comments, for instance). State
//! declarations additionally wrap their type in `State<...>`.

use mr_core::{Prop, State};

use crate::error::CodegenError;

/// Visibility qualifier every declaration must start with.
const VISIBILITY_PREFIX: &str = "private ";

/// Opening of the reactive cell type.
const STATE_WRAPPER_PREFIX: &str = "State<";

/// Closing of the reactive cell type.
const STATE_WRAPPER_SUFFIX: char = '>';

/// Parses a Prop declaration.
///
/// `line` is the 1-indexed line number and `content` the whitespace-trimmed
/// line.
///
/// # Examples
///
/// ```
/// use mr_codegen::parse_prop;
///
/// let prop = parse_prop(4, "private int n_butt;")?;
/// assert_eq!(prop.ty, "int");
/// assert_eq!(prop.name, "n_butt");
/// # Ok::<(), mr_codegen::CodegenError>(())
/// ```
pub fn parse_prop(line: usize, content: &str) -> Result<Prop, CodegenError> {
    let (ty, name) = split_declaration(line, content)?;
    Ok(Prop::new(ty, name))
}

/// Parses a State declaration, unwrapping the `State<...>` type.
///
/// # Examples
///
/// ```
/// use mr_codegen::parse_state;
///
/// let state = parse_state(7, "private State<bool> is_active;")?;
/// assert_eq!(state.ty, "bool");
/// assert_eq!(state.name, "is_active");
/// # Ok::<(), mr_codegen::CodegenError>(())
/// ```
pub fn parse_state(line: usize, content: &str) -> Result<State, CodegenError> {
    let (wrapped, name) = split_declaration(line, content)?;
    let inner = wrapped
        .strip_prefix(STATE_WRAPPER_PREFIX)
        .and_then(|rest| rest.strip_suffix(STATE_WRAPPER_SUFFIX))
        .filter(|inner| !inner.is_empty())
        .ok_or_else(|| CodegenError::MalformedStateType {
            line,
            ty: wrapped.to_owned(),
        })?;
    Ok(State::new(inner, name))
}

/// Splits `private <type> <name>; ...` into its type and name tokens.
fn split_declaration(line: usize, content: &str) -> Result<(&str, &str), CodegenError> {
    let rest = content
        .strip_prefix(VISIBILITY_PREFIX)
        .ok_or_else(|| CodegenError::MissingVisibility {
            line,
            content: content.to_owned(),
        })?;

    let declaration = rest.split_once(';').map_or(rest, |(head, _)| head);
    let tokens: Vec<&str> = declaration.split_whitespace().collect();

    match tokens.as_slice() {
        &[ty, name] => Ok((ty, name)),
        _ => Err(CodegenError::TokenCount {
            line,
            found: tokens.len(),
            content: content.to_owned(),
        }),
    }
}
