//! The line state machine.
//!
//! [`regenerate`] folds every line of a file through a `Machine`. Each step
//! consumes the machine and returns the next one, so the whole pass is a pure
//! function of the input text and the protocol markers.

use mr_core::{Advisory, Prop, ProtocolConfig, State};

use crate::declaration::{parse_prop, parse_state};
use crate::error::CodegenError;
use crate::render::{render_formal_params, render_prop_diff, render_state_accessors};
use crate::stage::Stage;

/// Byte order mark some editors prepend to the first line.
const BOM: char = '\u{feff}';

/// Result of running the state machine over one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regeneration {
    /// The first line does not carry the header marker (or the file is empty).
    NotAnnotated,
    /// The file is annotated and every generated region was rendered.
    Annotated(Regenerated),
}

/// The output of a successful pass over an annotated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regenerated {
    /// Full file text with the three generated regions rewritten.
    pub text: String,
    /// Props in declaration order.
    pub props: Vec<Prop>,
    /// States in declaration order.
    pub states: Vec<State>,
    /// Hints for Props with unrecognised types.
    pub advisories: Vec<Advisory>,
    /// `true` if any generated region differs from the input.
    pub changed: bool,
}

/// Regenerates the generated regions of `text`.
///
/// Lines keep their original terminators, so everything outside the three
/// generated regions is reproduced byte for byte.
///
/// # Errors
///
/// Returns a [`CodegenError`] if a declaration following an attribute marker
/// is malformed, or if the file ends before all three regions were seen.
///
/// # Examples
///
/// ```
/// use mr_codegen::{Regeneration, regenerate};
/// use mr_core::ProtocolConfig;
///
/// let protocol = ProtocolConfig::default();
/// let plain = "using Godot;\n";
/// assert_eq!(regenerate(plain, &protocol)?, Regeneration::NotAnnotated);
/// # Ok::<(), mr_codegen::CodegenError>(())
/// ```
pub fn regenerate(text: &str, protocol: &ProtocolConfig) -> Result<Regeneration, CodegenError> {
    let folded = text
        .split_inclusive('\n')
        .enumerate()
        .try_fold(Machine::new(protocol, text.len()), |machine, (index, line)| {
            machine.step(index + 1, line)
        });

    match folded {
        Ok(machine) => machine.finish(),
        Err(Halt::NotAnnotated) => Ok(Regeneration::NotAnnotated),
        Err(Halt::Fault(err)) => Err(err),
    }
}

/// Which declaration the next line must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    State,
    Prop,
}

/// Early exit from the fold.
#[derive(Debug)]
enum Halt {
    NotAnnotated,
    Fault(CodegenError),
}

impl From<CodegenError> for Halt {
    fn from(err: CodegenError) -> Self {
        Self::Fault(err)
    }
}

/// Accumulated state of one pass.
#[derive(Debug)]
struct Machine<'p> {
    protocol: &'p ProtocolConfig,
    stage: Stage,
    expect: Option<Expect>,
    out: String,
    props: Vec<Prop>,
    states: Vec<State>,
    advisories: Vec<Advisory>,
    changed: bool,
}

impl<'p> Machine<'p> {
    fn new(protocol: &'p ProtocolConfig, capacity: usize) -> Self {
        Self {
            protocol,
            stage: Stage::FirstLine,
            expect: None,
            out: String::with_capacity(capacity),
            props: Vec::new(),
            states: Vec::new(),
            advisories: Vec::new(),
            changed: false,
        }
    }

    /// Consumes one physical line, terminator included.
    fn step(mut self, number: usize, line: &str) -> Result<Self, Halt> {
        match self.stage {
            Stage::FirstLine => {
                if !line
                    .trim_start_matches(BOM)
                    .starts_with(&self.protocol.header_marker)
                {
                    return Err(Halt::NotAnnotated);
                }
                self.out.push_str(line);
                self.stage = self.stage.next();
            }
            Stage::WaitingForState | Stage::WaitingForParams | Stage::WaitingForDiff => {
                self.out.push_str(line);
                self.scan(number, line.trim())?;
            }
            Stage::AtState | Stage::AtParams | Stage::AtDiff => {
                let mut generated = match self.stage {
                    Stage::AtState => render_state_accessors(&self.states),
                    Stage::AtParams => render_formal_params(&self.props),
                    _ => render_prop_diff(&self.props),
                };
                generated.push_str(line_terminator(line));
                self.changed |= generated != line;
                self.out.push_str(&generated);
                self.stage = self.stage.next();
            }
            Stage::Tail => self.out.push_str(line),
        }
        Ok(self)
    }

    /// Attribute and marker scanning for the `Waiting*` stages.
    fn scan(&mut self, number: usize, trimmed: &str) -> Result<(), CodegenError> {
        match self.expect.take() {
            Some(Expect::State) => self.states.push(parse_state(number, trimmed)?),
            Some(Expect::Prop) => {
                let prop = parse_prop(number, trimmed)?;
                self.advisories.extend(Advisory::check(number, &prop));
                self.props.push(prop);
            }
            None if trimmed.starts_with(&self.protocol.generated_marker) => {
                self.stage = self.stage.next();
            }
            None if trimmed == self.protocol.state_attribute => {
                self.expect = Some(Expect::State);
            }
            None if trimmed == self.protocol.prop_attribute => {
                self.expect = Some(Expect::Prop);
            }
            None => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Regeneration, CodegenError> {
        match self.stage {
            Stage::FirstLine => Ok(Regeneration::NotAnnotated),
            Stage::Tail => Ok(Regeneration::Annotated(Regenerated {
                text: self.out,
                props: self.props,
                states: self.states,
                advisories: self.advisories,
                changed: self.changed,
            })),
            stage => Err(CodegenError::Truncated { stage }),
        }
    }
}

/// Returns the `\r\n`, `\n` or empty terminator of `line`.
fn line_terminator(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "// META_PROGRAM: react.godot script.\n";
    const MARKER: &str = "    // Don't edit! Generated by meta programming.\n";

    fn annotated(text: &str) -> Regenerated {
        match regenerate(text, &ProtocolConfig::default()).unwrap() {
            Regeneration::Annotated(regenerated) => regenerated,
            Regeneration::NotAnnotated => panic!("expected an annotated file"),
        }
    }

    fn skeleton(declarations: &str) -> String {
        format!(
            "{HEADER}public class Box {{\n{declarations}{MARKER}    old\n    void Update(\n{MARKER}        old\n    ) {{\n{MARKER}        old\n    }}\n}}\n"
        )
    }

    #[test]
    fn test_not_annotated_without_header() {
        let protocol = ProtocolConfig::default();
        assert_eq!(
            regenerate("using Godot;\n// META_PROGRAM: react.godot script.\n", &protocol).unwrap(),
            Regeneration::NotAnnotated
        );
    }

    #[test]
    fn test_empty_file_is_not_annotated() {
        assert_eq!(
            regenerate("", &ProtocolConfig::default()).unwrap(),
            Regeneration::NotAnnotated
        );
    }

    #[test]
    fn test_header_after_bom_is_recognised() {
        let text = format!("\u{feff}{}", skeleton(""));
        let regenerated = annotated(&text);
        assert!(regenerated.text.starts_with('\u{feff}'));
    }

    #[test]
    fn test_empty_declarations_render_placeholders() {
        let regenerated = annotated(&skeleton(""));
        assert!(regenerated.changed);
        assert!(regenerated.props.is_empty());
        assert!(regenerated.states.is_empty());
        assert_eq!(regenerated.text.matches("// Don't delete this line. ").count(), 3);
        assert!(!regenerated.text.contains("old"));
    }

    #[test]
    fn test_collects_declarations_in_order() {
        let declarations = "    [ReactProp]\n    private int x;\n    [ReactState]\n    private State<int> hp;\n    [ReactProp]\n    private string y; // label\n";
        let regenerated = annotated(&skeleton(declarations));
        assert_eq!(
            regenerated.props,
            vec![Prop::new("int", "x"), Prop::new("string", "y")]
        );
        assert_eq!(regenerated.states, vec![State::new("int", "hp")]);
        assert!(regenerated.advisories.is_empty());
        assert!(
            regenerated
                .text
                .contains("\n        int x_, string y_\n")
        );
        assert!(regenerated.text.contains("public int P_hp { get => hp.Get(police);"));
    }

    #[test]
    fn test_second_pass_is_unchanged() {
        let declarations = "    [ReactState]\n    private State<bool> open;\n";
        let first = annotated(&skeleton(declarations));
        let second = annotated(&first.text);
        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn test_attribute_line_itself_is_not_parsed() {
        // The declaration is the line after the attribute, blank or not.
        let declarations = "    [ReactProp]\n\n";
        let err = regenerate(&skeleton(declarations), &ProtocolConfig::default()).unwrap_err();
        assert_eq!(
            err,
            CodegenError::MissingVisibility {
                line: 4,
                content: String::new(),
            }
        );
    }

    #[test]
    fn test_malformed_state_type_is_rejected() {
        let declarations = "    [ReactState]\n    private int hp;\n";
        let err = regenerate(&skeleton(declarations), &ProtocolConfig::default()).unwrap_err();
        assert!(matches!(err, CodegenError::MalformedStateType { line: 4, .. }));
    }

    #[test]
    fn test_unknown_prop_type_yields_advisory() {
        let declarations = "    [ReactProp]\n    private Node target;\n";
        let regenerated = annotated(&skeleton(declarations));
        assert_eq!(regenerated.advisories.len(), 1);
        assert_eq!(regenerated.advisories[0].line, 4);
        assert_eq!(regenerated.props.len(), 1);
    }

    #[test]
    fn test_truncated_file_reports_stage() {
        let text = format!("{HEADER}class A {{\n{MARKER}    old\n");
        let err = regenerate(&text, &ProtocolConfig::default()).unwrap_err();
        assert_eq!(
            err,
            CodegenError::Truncated {
                stage: Stage::WaitingForParams
            }
        );
    }

    #[test]
    fn test_marker_on_last_line_is_truncated() {
        let text = format!("{HEADER}{MARKER}");
        let err = regenerate(&text, &ProtocolConfig::default()).unwrap_err();
        assert_eq!(err, CodegenError::Truncated { stage: Stage::AtState });
    }

    #[test]
    fn test_tail_is_not_scanned() {
        let tail = "    [ReactProp]\n    this is not a declaration\n";
        let text = format!("{}{tail}", skeleton(""));
        let regenerated = annotated(&text);
        assert!(regenerated.props.is_empty());
        assert!(regenerated.text.ends_with(tail));
    }

    #[test]
    fn test_crlf_terminators_are_preserved() {
        let text = skeleton("    [ReactProp]\n    private int x;\n").replace('\n', "\r\n");
        let regenerated = annotated(&text);
        assert_eq!(regenerated.text.matches("\r\n").count(), text.matches("\r\n").count());
        assert!(!regenerated.text.replace("\r\n", "").contains('\n'));
        assert!(regenerated.text.contains("        int x_\r\n"));
    }

    #[test]
    fn test_final_region_without_newline() {
        let text = format!("{HEADER}{MARKER}    a\n{MARKER}    b\n{MARKER}    c");
        let regenerated = annotated(&text);
        assert!(regenerated.text.ends_with("        // Don't delete this line. "));
    }

    #[test]
    fn test_line_terminator() {
        assert_eq!(line_terminator("abc\r\n"), "\r\n");
        assert_eq!(line_terminator("abc\n"), "\n");
        assert_eq!(line_terminator("abc"), "");
    }
}
