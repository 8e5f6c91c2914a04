//! Names and LaTeX shapes of the registers the compiled program lives in.
//!
//! The target has no memory beyond named registers, so the whole machine
//! state is four expressions: the simulated stack, the frame-pointer list,
//! the return-value scalar, and the return-address list. Everything here
//! produces LaTeX fragments; the mnemonics `IN`, `OUT`, `DONE`, `LINE`,
//! `NEXTLINE`, and `GOTO` stay symbolic until the packager resolves them.

use crate::ast::Ty;

/// List register holding every live scope's cells.
pub const STACK: &str = "S_{tack}";

/// List register whose last element is the current frame's base index.
/// Initialized with a `-1` sentinel so it is never empty.
pub const FRAME_PTRS: &str = "S_{tackPtrs}";

/// Scalar register holding the most recently evaluated expression.
pub const RETURN_VAL: &str = "R_{eturnVal}";

/// List register of line indices to resume at after a return.
pub const RETURN_LINES: &str = "R_{eturnLines}";

/// Preamble helper: replace the last element of a list.
pub const REPLACE_LAST: &str = "R_{eplaceLast}";

/// Preamble helper: extend a list with n zero cells.
pub const EXTEND_ZERO: &str = "E_{xtendZero}";

/// Preamble helper: drop the last element of a list.
pub const DROP_LAST: &str = "D_{ropLast}";

/// Cell count of a type, or `None` for types the table does not know.
pub fn sizeof(ty: &Ty) -> Option<u32> {
    match ty.0.as_str() {
        "num" => Some(1),
        _ => None,
    }
}

/// Source names that bind to built-in host registers and are therefore
/// unavailable for user declarations.
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with('$') || matches!(name, "IN" | "OUT" | "DONE" | "LINE")
}

/// The assembly mnemonic a `$`-sigiled source name refers to, if valid.
pub fn host_register(name: &str) -> Option<&'static str> {
    match name {
        "$IN" => Some("IN"),
        "$OUT" => Some("OUT"),
        "$DONE" => Some("DONE"),
        _ => None,
    }
}

pub fn join2(a: &str, b: &str) -> String {
    format!("\\operatorname{{join}}\\left({},{}\\right)", a, b)
}

pub fn length(list: &str) -> String {
    format!("\\operatorname{{length}}\\left({}\\right)", list)
}

/// The last element of a list register.
pub fn last(list: &str) -> String {
    format!("{}\\left[{}\\right]", list, length(list))
}

pub fn replace_last(list: &str, val: &str) -> String {
    format!("{}\\left({},{}\\right)", REPLACE_LAST, list, val)
}

pub fn extend_zero(list: &str, cells: u32) -> String {
    format!("{}\\left({},{}\\right)", EXTEND_ZERO, list, cells)
}

pub fn drop_last(list: &str) -> String {
    format!("{}\\left({}\\right)", DROP_LAST, list)
}

/// The current function's frame base: top of the frame-pointer list.
pub fn current_frame_base() -> String {
    last(FRAME_PTRS)
}

/// Preamble definitions for the three list manipulators.
pub fn helper_definitions() -> Vec<String> {
    vec![
        format!(
            "{}\\left(l_{{ist}},v_{{al}}\\right)=\\operatorname{{join}}\\left(l_{{ist}}\\left[1...\\operatorname{{length}}\\left(l_{{ist}}\\right)-1\\right],v_{{al}}\\right)",
            REPLACE_LAST
        ),
        format!(
            "{}\\left(l_{{ist}},n\\right)=\\operatorname{{join}}\\left(l_{{ist}},\\left[1...n\\right]\\cdot0\\right)",
            EXTEND_ZERO
        ),
        format!(
            "{}\\left(l_{{ist}}\\right)=l_{{ist}}\\left[1...\\operatorname{{length}}\\left(l_{{ist}}\\right)-1\\right]",
            DROP_LAST
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizeof_num() {
        assert_eq!(sizeof(&Ty::num()), Some(1));
        assert_eq!(sizeof(&Ty("matrix".to_string())), None);
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_name("IN"));
        assert!(is_reserved_name("OUT"));
        assert!(is_reserved_name("DONE"));
        assert!(is_reserved_name("$IN"));
        assert!(is_reserved_name("$anything"));
        assert!(!is_reserved_name("x"));
        assert!(!is_reserved_name("input"));
    }

    #[test]
    fn test_host_register_mapping() {
        assert_eq!(host_register("$IN"), Some("IN"));
        assert_eq!(host_register("$OUT"), Some("OUT"));
        assert_eq!(host_register("$DONE"), Some("DONE"));
        assert_eq!(host_register("$X"), None);
        assert_eq!(host_register("IN"), None);
    }

    #[test]
    fn test_current_frame_base_shape() {
        assert_eq!(
            current_frame_base(),
            "S_{tackPtrs}\\left[\\operatorname{length}\\left(S_{tackPtrs}\\right)\\right]"
        );
    }

    #[test]
    fn test_helper_call_shapes() {
        assert_eq!(
            extend_zero(STACK, 1),
            "E_{xtendZero}\\left(S_{tack},1\\right)"
        );
        assert_eq!(drop_last(RETURN_LINES), "D_{ropLast}\\left(R_{eturnLines}\\right)");
    }
}
