//! Rendering of the three generated regions.
//!
//! Each region is a single physical line. An empty declaration list renders
//! [`PLACEHOLDER`] so the line stays non-blank and is found again on the next
//! pass.

use std::fmt::Write;

use mr_core::{Prop, State};

/// Text written into a generated region that has nothing to generate.
pub const PLACEHOLDER: &str = "// Don't delete this line. ";

/// Leading indentation of the state accessor region (class member level).
const MEMBER_INDENT: &str = "    ";

/// Leading indentation of the parameter and diff regions (method body level).
const BODY_INDENT: &str = "        ";

/// Name of the policing object passed to `State<T>.Get`.
const POLICE: &str = "police";

/// Flag set by the diff block when any Prop changed.
const RERENDER_FLAG: &str = "need_react";

/// Renders the state accessor region, without a line terminator.
///
/// # Examples
///
/// ```
/// use mr_codegen::render_state_accessors;
/// use mr_core::State;
///
/// let line = render_state_accessors(&[State::new("int", "hp")]);
/// assert_eq!(
///     line,
///     "    public int P_hp { get => hp.Get(police); set { hp.Set(value); } } "
/// );
/// ```
#[must_use]
pub fn render_state_accessors(states: &[State]) -> String {
    let mut line = String::from(MEMBER_INDENT);
    if states.is_empty() {
        line.push_str(PLACEHOLDER);
        return line;
    }
    for state in states {
        let _ = write!(
            line,
            "public {ty} {accessor} {{ get => {name}.Get({POLICE}); set {{ {name}.Set(value); }} }} ",
            ty = state.ty,
            accessor = state.accessor_name(),
            name = state.name,
        );
    }
    line
}

/// Renders the formal parameter region, without a line terminator.
///
/// # Examples
///
/// ```
/// use mr_codegen::render_formal_params;
/// use mr_core::Prop;
///
/// let line = render_formal_params(&[Prop::new("int", "x"), Prop::new("string", "y")]);
/// assert_eq!(line, "        int x_, string y_");
/// ```
#[must_use]
pub fn render_formal_params(props: &[Prop]) -> String {
    let mut line = String::from(BODY_INDENT);
    if props.is_empty() {
        line.push_str(PLACEHOLDER);
        return line;
    }
    let params: Vec<String> = props.iter().map(Prop::formal_param).collect();
    line.push_str(&params.join(", "));
    line
}

/// Renders the prop diff region, without a line terminator.
///
/// Every Prop gets a guarded assignment that copies the incoming parameter
/// into the field and raises the re-render flag when the values differ.
///
/// # Examples
///
/// ```
/// use mr_codegen::render_prop_diff;
/// use mr_core::Prop;
///
/// let line = render_prop_diff(&[Prop::new("int", "x")]);
/// assert_eq!(line, "        if (x != x_) { x = x_; need_react = true; } ");
/// ```
#[must_use]
pub fn render_prop_diff(props: &[Prop]) -> String {
    let mut line = String::from(BODY_INDENT);
    if props.is_empty() {
        line.push_str(PLACEHOLDER);
        return line;
    }
    for prop in props {
        let _ = write!(
            line,
            "if ({name} != {param}) {{ {name} = {param}; {RERENDER_FLAG} = true; }} ",
            name = prop.name,
            param = prop.param_name(),
        );
    }
    line
}
