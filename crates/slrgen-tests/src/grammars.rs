//! Grammar definition for integration tests.

use slrgen::grammar::{
    Assoc,
    Elem::{N, T},
    GrammarDef, GrammarError, Precedence,
};

pub type GrammarFn = fn(&mut GrammarDef<'_>) -> Result<(), GrammarError>;

/// All grammars, by name.
pub const ALL: &[(&str, GrammarFn)] = &[
    ("arithmetic", arithmetic),
    ("arithmetic_prec", arithmetic_prec),
    ("g_simple1", g_simple1),
    ("g_simple2", g_simple2),
    ("g2", g2),
    ("g4", g4),
    ("optional_tail", optional_tail),
    ("unreachable", unreachable),
];

pub fn arithmetic(g: &mut GrammarDef<'_>) -> Result<(), GrammarError> {
    let plus = g.terminal("PLUS", None)?;
    let ident = g.terminal("ID", None)?;

    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;

    // E → E + T | T
    // T → id
    g.rule(e, [N(e), T(plus), N(t)], None)?;
    g.rule(e, [N(t)], None)?;
    g.rule(t, [T(ident)], None)?;
    Ok(())
}

pub fn arithmetic_prec(g: &mut GrammarDef<'_>) -> Result<(), GrammarError> {
    let lparen = g.terminal("LPAREN", None)?;
    let rparen = g.terminal("RPAREN", None)?;
    let plus = g.terminal("PLUS", Some(Precedence::new(0, Assoc::Left)))?;
    let minus = g.terminal("MINUS", Some(Precedence::new(0, Assoc::Left)))?;
    let star = g.terminal("STAR", Some(Precedence::new(1, Assoc::Left)))?;
    let slash = g.terminal("SLASH", Some(Precedence::new(1, Assoc::Left)))?;
    let caret = g.terminal("CARET", Some(Precedence::new(3, Assoc::Right)))?;
    let num = g.terminal("NUM", None)?;

    let expr = g.nonterminal("EXPR")?;

    for op in [plus, minus, star, slash, caret] {
        g.rule(expr, [N(expr), T(op), N(expr)], None)?;
    }
    // unary minus binds tighter than any binary operator but `^'
    g.rule(expr, [T(minus), N(expr)], Some(Precedence::new(2, Assoc::Right)))?;
    g.rule(expr, [T(lparen), N(expr), T(rparen)], None)?;
    g.rule(expr, [T(num)], None)?;
    Ok(())
}

/// LALR(1) but not SLR(1).
pub fn g_simple1(g: &mut GrammarDef<'_>) -> Result<(), GrammarError> {
    let equal = g.terminal("EQUAL", None)?;
    let plus = g.terminal("PLUS", None)?;
    let ident = g.terminal("ID", None)?;
    let num = g.terminal("NUM", None)?;

    let a = g.nonterminal("A")?;
    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;

    g.start_symbol(a)?;

    g.rule(a, [N(e), T(equal), N(e)], None)?;
    g.rule(a, [T(ident)], None)?;
    g.rule(e, [N(e), T(plus), N(t)], None)?;
    g.rule(e, [N(t)], None)?;
    g.rule(t, [T(num)], None)?;
    g.rule(t, [T(ident)], None)?;
    Ok(())
}

pub fn g_simple2(g: &mut GrammarDef<'_>) -> Result<(), GrammarError> {
    // declare terminal symbols.
    let lparen = g.terminal("LPAREN", None)?;
    let rparen = g.terminal("RPAREN", None)?;
    let plus = g.terminal("PLUS", None)?;
    let minus = g.terminal("MINUS", None)?;
    let star = g.terminal("STAR", None)?;
    let slash = g.terminal("SLASH", None)?;
    let num = g.terminal("NUM", None)?;

    // declare nonterminal symbols.
    let expr = g.nonterminal("EXPR")?;
    let factor = g.nonterminal("FACTOR")?;
    let term = g.nonterminal("TERM")?;

    g.start_symbol(expr)?;

    // declare syntax rules.
    g.rule(expr, [N(expr), T(plus), N(factor)], None)?; // expr '+' factor
    g.rule(expr, [N(expr), T(minus), N(factor)], None)?; // expr '-' factor
    g.rule(expr, [N(factor)], None)?; // factor
    g.rule(factor, [N(factor), T(star), N(term)], None)?; // factor '*' term
    g.rule(factor, [N(factor), T(slash), N(term)], None)?; // factor '/' term
    g.rule(factor, [N(term)], None)?; // term
    g.rule(term, [T(num)], None)?; // num
    g.rule(term, [T(lparen), N(expr), T(rparen)], None)?; // '(' expr ')'
    Ok(())
}

/// LR(1) but not LALR(1), let alone SLR(1).
pub fn g2(g: &mut GrammarDef<'_>) -> Result<(), GrammarError> {
    let comma = g.terminal("COMMA", None)?;
    let colon = g.terminal("COLON", None)?;
    let ident = g.terminal("ID", None)?;

    let def = g.nonterminal("DEF")?;
    let param_spec = g.nonterminal("PARAM_SPEC")?;
    let return_spec = g.nonterminal("RETURN_SPEC")?;
    let type_ = g.nonterminal("TYPE")?;
    let name = g.nonterminal("NAME")?;
    let name_list = g.nonterminal("NAME_LIST")?;

    g.rule(def, [N(param_spec), N(return_spec), T(comma)], None)?;
    g.rule(param_spec, [N(type_)], None)?;
    g.rule(param_spec, [N(name_list), T(colon), N(type_)], None)?;
    g.rule(return_spec, [N(type_)], None)?;
    g.rule(return_spec, [N(name), T(colon), N(type_)], None)?;
    g.rule(type_, [T(ident)], None)?;
    g.rule(name, [T(ident)], None)?;
    g.rule(name_list, [N(name)], None)?;
    g.rule(name_list, [N(name), T(comma), N(name_list)], None)?;
    Ok(())
}

pub fn g4(g: &mut GrammarDef<'_>) -> Result<(), GrammarError> {
    let plus = g.terminal("PLUS", None)?;
    let lparen = g.terminal("LPAREN", None)?;
    let rparen = g.terminal("RPAREN", None)?;
    let num = g.terminal("NUM", None)?;

    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;
    // E → E + T | T
    // T → ( E ) | n

    g.rule(e, [N(e), T(plus), N(t)], None)?;
    g.rule(e, [N(t)], None)?;
    g.rule(t, [T(lparen), N(e), T(rparen)], None)?;
    g.rule(t, [T(num)], None)?;
    Ok(())
}

/// `S → A $end`, `A → a A | ε`, with the end-of-input marker spelled out.
pub fn optional_tail(g: &mut GrammarDef<'_>) -> Result<(), GrammarError> {
    let a_ = g.terminal("a", None)?;

    let s = g.nonterminal("S")?;
    let a = g.nonterminal("A")?;

    let eoi = g.end_of_input();
    g.rule(s, [N(a), T(eoi)], None)?;
    g.rule(a, [T(a_), N(a)], None)?;
    g.rule(a, std::iter::empty(), None)?;
    Ok(())
}

/// `U` is never reachable from the start symbol.
pub fn unreachable(g: &mut GrammarDef<'_>) -> Result<(), GrammarError> {
    let a = g.terminal("a", None)?;
    let b = g.terminal("b", None)?;

    let s = g.nonterminal("S")?;
    let u = g.nonterminal("U")?;

    g.rule(s, [T(a)], None)?;
    g.rule(u, [T(b)], None)?;
    Ok(())
}
