//! Macros, variables and functions.

use c2ast_core::{CFunction, CFunctionParameter, CMacroObject, CNode, CVariable};

use super::calling_convention;
use crate::classify::classify;
use crate::clang::{ClangTranslationUnit, CursorKind};
use crate::error::Result;
use crate::session::{ExploreSession, InfoNode};

pub(super) fn macro_object<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let tokens = session.unit().macro_tokens(info.cursor);
    Ok(CNode::MacroObject(CMacroObject {
        name: info.name,
        location: info.location,
        value: macro_value(&tokens),
        type_name: infer_macro_type(&tokens).map(str::to_string),
        tokens,
    }))
}

/// The variable's type is described but not explored.
pub(super) fn variable<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let factory = session.factory();
    let (kind, ty) = classify(session.unit(), info.ty)?;
    let type_name = factory.type_name(kind, ty, Some(&info.name), 0)?;
    let type_info = factory.create_type(kind, &type_name, ty, info.ty)?;

    Ok(CNode::Variable(CVariable {
        name: info.name,
        location: info.location,
        type_info,
    }))
}

pub(super) fn function<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let unit = session.unit();
    let name = info.name;
    let ty = info.ty;

    let return_type = session.visit_type(unit.result_type(ty), Some(&name), 0)?;

    let cursors = unit.children_of_kind(info.cursor, CursorKind::ParmDecl);
    let mut parameters = Vec::with_capacity(cursors.len());
    for (index, parameter) in cursors.into_iter().enumerate() {
        let parameter_type = unit.cursor_type(parameter);
        let type_info = session.visit_type(parameter_type, Some(&name), index)?;
        parameters.push(CFunctionParameter {
            name: unit.cursor_spelling(parameter),
            location: session.factory().location(parameter, parameter_type)?,
            type_info,
        });
    }

    Ok(CNode::Function(CFunction {
        name,
        location: info.location,
        calling_convention: calling_convention(unit.calling_convention(ty)),
        return_type,
        parameters,
        is_variadic: unit.is_function_variadic(ty),
    }))
}

fn is_unary_operator(token: &str) -> bool {
    matches!(token, "-" | "+" | "~" | "!")
}

fn ends_operand(token: &str) -> bool {
    token
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | ')' | ']' | '"' | '\''))
}

/// Join macro tokens into a normalized replacement text.
pub fn macro_value(tokens: &[String]) -> String {
    let mut value = String::new();
    let mut previous: Option<&str> = None;
    let mut glue_next = true;

    for token in tokens {
        let token = token.as_str();
        let glue = glue_next
            || matches!(token, ")" | "]" | "," | ";")
            || matches!(previous, Some("(") | Some("["))
            || (token == "(" && previous.is_some_and(|p| ends_operand(p) && !p.ends_with(')')));
        if !glue {
            value.push(' ');
        }
        value.push_str(token);

        glue_next = is_unary_operator(token) && !previous.is_some_and(ends_operand);
        previous = Some(token);
    }
    value
}

fn integer_type(suffix: &str) -> Option<&'static str> {
    match suffix {
        "" => Some("int"),
        "u" => Some("unsigned int"),
        "l" => Some("long"),
        "ul" | "lu" => Some("unsigned long"),
        "ll" => Some("long long"),
        "ull" | "llu" => Some("unsigned long long"),
        _ => None,
    }
}

fn split_suffix<'t>(literal: &'t str, suffix_chars: &[char]) -> (&'t str, &'t str) {
    let body = literal.trim_end_matches(suffix_chars);
    (body, &literal[body.len()..])
}

fn number_type(literal: &str) -> Option<&'static str> {
    let lower = literal.to_ascii_lowercase();

    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, lower.as_str())
    };

    if radix == 10 && (digits.contains('.') || digits.contains('e')) {
        let (body, suffix) = split_suffix(digits, &['f', 'l']);
        body.parse::<f64>().ok()?;
        return match suffix {
            "f" => Some("float"),
            "" | "l" => Some("double"),
            _ => None,
        };
    }

    let (body, suffix) = split_suffix(digits, &['u', 'l']);
    let value = u64::from_str_radix(body, radix).ok()?;
    let ty = integer_type(suffix)?;
    if suffix.is_empty() && value > i32::MAX as u64 {
        return Some(if radix != 10 && value <= u32::MAX as u64 {
            "unsigned int"
        } else {
            "long long"
        });
    }
    Some(ty)
}

/// C type of a macro whose replacement is a single literal, optionally
/// signed or parenthesized.
pub fn infer_macro_type(tokens: &[String]) -> Option<&'static str> {
    let mut tokens = tokens;
    loop {
        match tokens {
            [open, inner @ .., close] if open == "(" && close == ")" => tokens = inner,
            [sign, rest @ ..] if is_unary_operator(sign) && sign != "!" && sign != "~" => {
                let literal = rest.first()?;
                if rest.len() == 1 && literal.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                    return number_type(literal);
                }
                tokens = rest;
                if !matches!(tokens.first().map(String::as_str), Some("(")) {
                    return None;
                }
            }
            [] => return None,
            strings if strings.iter().all(|t| t.starts_with('"')) => return Some("const char*"),
            [literal] if literal.starts_with('\'') => return Some("char"),
            [literal] if literal.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
                return number_type(literal)
            }
            _ => return None,
        }
    }
}
