use callgrind_toolchain_diagnostics::{Diagnostic, Span, codes};

use super::ctx;
use super::names::NameTable;

/// Which per-category compression table a record resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SymbolCategory {
    /// Function names (`fn=`, `cfn=`).
    Function,
    /// Object/binary names (`ob=`, `cob=`).
    Object,
}

/// What a matched record does to the session beyond resolving its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordEffect {
    /// `fn=` — the resolved function becomes the current profiled unit and a
    /// descriptor is appended to the profile.
    EnterFunction,
    /// `cfn=` — the callee of a call-graph edge. Resolved so the compression
    /// table stays consistent; reserved for call-edge modeling.
    CalledFunction,
    /// `ob=` — the resolved name replaces the ambient object context.
    SetObjectContext,
    /// `cob=` — the callee side's object. Resolved only; reserved.
    CalledObject,
}

/// One entry of the body-record grammar: a two-letter tag, whether this is
/// the called-context (`c`-prefixed) variant, the table its symbol lives in,
/// and the effect of a match.
struct RecordSpec {
    tag: &'static str,
    called: bool,
    category: SymbolCategory,
    effect: RecordEffect,
}

/// The body-record grammar in fixed priority order. Walked once per body
/// line; adding a record kind means adding a row here, not a new function.
const RECORDS: &[RecordSpec] = &[
    RecordSpec {
        tag: "fn",
        called: false,
        category: SymbolCategory::Function,
        effect: RecordEffect::EnterFunction,
    },
    RecordSpec {
        tag: "fn",
        called: true,
        category: SymbolCategory::Function,
        effect: RecordEffect::CalledFunction,
    },
    RecordSpec {
        tag: "ob",
        called: false,
        category: SymbolCategory::Object,
        effect: RecordEffect::SetObjectContext,
    },
    RecordSpec {
        tag: "ob",
        called: true,
        category: SymbolCategory::Object,
        effect: RecordEffect::CalledObject,
    },
];

/// Match `line` against one grammar entry, returning the text after the `=`.
///
/// A called variant is recognized by a leading `c` immediately before the
/// tag; it is stripped and the base grammar reused on the remainder.
fn match_record<'a>(line: &'a str, spec: &RecordSpec) -> Option<&'a str> {
    let base = if spec.called {
        line.strip_prefix('c')?
    } else {
        line
    };
    base.strip_prefix(spec.tag)?.strip_prefix('=')
}

/// Outcome of resolving the symbol text after a record's `=`.
enum Resolution {
    /// A usable name, defined or looked up as needed.
    Name(String),
    /// A bare id reference to an id never defined in this table.
    Unresolved(u64),
    /// Neither an id reference nor a non-empty name.
    Empty,
}

/// Parse an optional compressed-id reference `(<digits>+)` at the start of
/// `rest`.
///
/// Returns the id and the text after the closing parenthesis. The digit run
/// must be non-empty and the parenthesis must close; otherwise the reference
/// is absent and the full text (including any `(`) is name material. Digit
/// runs too large for `u64` are likewise treated as literal name text.
fn parse_id_ref(rest: &str) -> (Option<u64>, &str) {
    let Some(body) = rest.strip_prefix('(') else {
        return (None, rest);
    };
    let digits_end = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    if digits_end == 0 || !body[digits_end..].starts_with(')') {
        return (None, rest);
    }
    match body[..digits_end].parse::<u64>() {
        Ok(id) => (Some(id), &body[digits_end + 1..]),
        Err(_) => (None, rest),
    }
}

/// Resolve the symbol text after a record's `=` against `table`.
///
/// With an id reference present, trailing text (spaces skipped) defines the
/// id, overwriting any prior mapping; no trailing text is a lookup. Without
/// one, the text itself (spaces skipped) is the name.
fn resolve_symbol(rest: &str, table: &mut NameTable) -> Resolution {
    let (id, after) = parse_id_ref(rest);
    match id {
        Some(id) => {
            let name = after.trim_start_matches(' ');
            if name.is_empty() {
                match table.lookup(id) {
                    Some(found) => Resolution::Name(found.to_string()),
                    None => Resolution::Unresolved(id),
                }
            } else {
                table.define(id, name);
                Resolution::Name(name.to_string())
            }
        }
        None => {
            let name = rest.trim_start_matches(' ');
            if name.is_empty() {
                Resolution::Empty
            } else {
                Resolution::Name(name.to_string())
            }
        }
    }
}

/// Classify one body line and resolve its symbol.
///
/// Returns the matched record's effect and resolved name, or `None` when the
/// line is blank, matches no record kind (unsupported records are skipped by
/// design), or matched a record that had to be skipped with a diagnostic.
pub(crate) fn dispatch_body_line(
    line: &str,
    span: Span,
    line_no: usize,
    functions: &mut NameTable,
    objects: &mut NameTable,
    diags: &mut Vec<Diagnostic>,
) -> Option<(RecordEffect, String)> {
    if line.is_empty() {
        return None;
    }

    for spec in RECORDS {
        let Some(rest) = match_record(line, spec) else {
            continue;
        };
        let table = match spec.category {
            SymbolCategory::Function => &mut *functions,
            SymbolCategory::Object => &mut *objects,
        };
        let record = if spec.called {
            format!("c{}", spec.tag)
        } else {
            spec.tag.to_string()
        };
        match resolve_symbol(rest, table) {
            Resolution::Name(name) => return Some((spec.effect, name)),
            Resolution::Unresolved(id) => {
                diags.push(
                    Diagnostic::error(
                        codes::UNRESOLVED_NAME_REF,
                        format!("{record}= references id {id}, which was never defined"),
                        Some(span),
                    )
                    .with_context(ctx!(
                        "record" => record,
                        "id" => id.to_string(),
                        "line" => line_no.to_string(),
                    )),
                );
                return None;
            }
            Resolution::Empty => {
                diags.push(
                    Diagnostic::warn(
                        codes::MALFORMED_RECORD,
                        format!("{record}= record has neither an id reference nor a name"),
                        Some(span),
                    )
                    .with_context(ctx!(
                        "record" => record,
                        "line" => line_no.to_string(),
                    )),
                );
                return None;
            }
        }
    }

    // Unsupported record kind (cost lines, call counts, positions): skipped.
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(
        line: &str,
        functions: &mut NameTable,
        objects: &mut NameTable,
        diags: &mut Vec<Diagnostic>,
    ) -> Option<(RecordEffect, String)> {
        dispatch_body_line(line, Span::new(0, line.len()), 1, functions, objects, diags)
    }

    #[test]
    fn id_ref_parsing() {
        assert_eq!(parse_id_ref("(12) main"), (Some(12), " main"));
        assert_eq!(parse_id_ref("(7)"), (Some(7), ""));
        // Empty digit run: not a reference.
        assert_eq!(parse_id_ref("() main"), (None, "() main"));
        // Unclosed parenthesis: not a reference.
        assert_eq!(parse_id_ref("(12 main"), (None, "(12 main"));
        // Non-digit inside: not a reference.
        assert_eq!(parse_id_ref("(1x) main"), (None, "(1x) main"));
        // No parenthesis at all.
        assert_eq!(parse_id_ref("main"), (None, "main"));
    }

    #[test]
    fn plain_name_without_id() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        let got = dispatch("fn=main", &mut f, &mut o, &mut d);
        assert_eq!(got, Some((RecordEffect::EnterFunction, "main".to_string())));
        assert!(f.is_empty(), "no id reference means no table entry");
        assert!(d.is_empty());
    }

    #[test]
    fn define_then_reference() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        dispatch("fn=(7) alpha", &mut f, &mut o, &mut d);
        let got = dispatch("cfn=(7)", &mut f, &mut o, &mut d);
        assert_eq!(got, Some((RecordEffect::CalledFunction, "alpha".to_string())));
        assert!(d.is_empty());
    }

    #[test]
    fn function_and_object_tables_are_independent() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        dispatch("fn=(1) main", &mut f, &mut o, &mut d);
        let got = dispatch("ob=(1)", &mut f, &mut o, &mut d);
        assert!(got.is_none(), "id 1 is only defined in the function table");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].id, codes::UNRESOLVED_NAME_REF);
    }

    #[test]
    fn unresolved_reference_is_reported_and_skipped() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        let got = dispatch("fn=(9)", &mut f, &mut o, &mut d);
        assert!(got.is_none());
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].id, codes::UNRESOLVED_NAME_REF);
        let ctx = d[0].context.as_ref().unwrap();
        assert_eq!(ctx.get("id").unwrap(), "9");
        assert_eq!(ctx.get("record").unwrap(), "fn");
    }

    #[test]
    fn empty_record_is_reported_and_skipped() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        let got = dispatch("fn=", &mut f, &mut o, &mut d);
        assert!(got.is_none());
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].id, codes::MALFORMED_RECORD);
    }

    #[test]
    fn malformed_id_ref_becomes_literal_name() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        let got = dispatch("fn=(12 main", &mut f, &mut o, &mut d);
        assert_eq!(
            got,
            Some((RecordEffect::EnterFunction, "(12 main".to_string()))
        );
        assert!(f.is_empty());
    }

    #[test]
    fn spaces_between_id_and_name_are_skipped() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        let got = dispatch("fn=(3)   spaced", &mut f, &mut o, &mut d);
        assert_eq!(got, Some((RecordEffect::EnterFunction, "spaced".to_string())));
        assert_eq!(f.lookup(3), Some("spaced"));
    }

    #[test]
    fn called_object_resolves_without_effect_mismatch() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        let got = dispatch("cob=(2) libc.so", &mut f, &mut o, &mut d);
        assert_eq!(
            got,
            Some((RecordEffect::CalledObject, "libc.so".to_string()))
        );
        assert_eq!(o.lookup(2), Some("libc.so"));
    }

    #[test]
    fn unrecognized_records_are_skipped_silently() {
        let (mut f, mut o, mut d) = (NameTable::new(), NameTable::new(), Vec::new());
        for line in ["1 100", "calls=2 41", "fl=(1) main.c", "totals: 12345", "fx=oops"] {
            assert!(dispatch(line, &mut f, &mut o, &mut d).is_none(), "{line}");
        }
        assert!(d.is_empty());
        assert!(f.is_empty());
        assert!(o.is_empty());
    }
}
